use futures_util::stream::{self, Stream};
use sweeper_core::{Cursor, Visibility};

use crate::retry::{RateLimitedExecutor, RetryPolicy};
use crate::slack::{ListRequest, SlackApi};
use crate::{ApiError, ChannelPage};

/// Slack's recommended page size for `conversations.list`.
pub const PAGE_SIZE: u32 = 30;

/// Pages through the full channel listing for the requested visibilities.
pub struct ChannelEnumerator<'a> {
    api: &'a dyn SlackApi,
    executor: &'a RateLimitedExecutor,
    types: Vec<Visibility>,
    page_size: u32,
    policy: RetryPolicy,
}

impl<'a> ChannelEnumerator<'a> {
    pub fn new(api: &'a dyn SlackApi, executor: &'a RateLimitedExecutor, types: Vec<Visibility>) -> Self {
        Self {
            api,
            executor,
            types,
            page_size: PAGE_SIZE,
            policy: RetryPolicy::unbounded(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetches one page, retrying rate limits as the policy allows
    /// (unbounded by default).
    pub async fn fetch_page(&self, cursor: Option<Cursor>) -> Result<ChannelPage, ApiError> {
        let request = ListRequest {
            limit: self.page_size,
            cursor,
            exclude_archived: true,
            types: self.types.clone(),
        };
        self.executor
            .execute("conversations.list", self.policy, || {
                self.api.list_channels(&request)
            })
            .await
    }

    /// Lazy page stream starting from the beginning of the listing.
    ///
    /// Each call starts a fresh pass. The stream ends after the page whose
    /// cursor is empty, or right after yielding the first error.
    pub fn pages(&self) -> impl Stream<Item = Result<ChannelPage, ApiError>> + '_ {
        stream::unfold(Some(None), move |next: Option<Option<Cursor>>| async move {
            let Some(cursor) = next else {
                return None;
            };
            match self.fetch_page(cursor).await {
                Ok(page) => {
                    let following = if page.next_cursor.is_end() {
                        None
                    } else {
                        Some(Some(page.next_cursor.clone()))
                    };
                    Some((Ok(page), following))
                }
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}
