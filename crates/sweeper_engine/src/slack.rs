use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sweeper_core::{ChannelCandidate, Cursor, Visibility};
use url::Url;

use crate::{ApiError, ChannelPage, FailureKind, LatestMessage};

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api/";

#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub base_url: String,
    pub token: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SlackSettings {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Parameters of one `conversations.list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub limit: u32,
    pub cursor: Option<Cursor>,
    pub exclude_archived: bool,
    pub types: Vec<Visibility>,
}

/// The three remote operations the sweeper needs.
#[async_trait::async_trait]
pub trait SlackApi: Send + Sync {
    async fn list_channels(&self, request: &ListRequest) -> Result<ChannelPage, ApiError>;

    /// Most recent message of the channel, `None` when the history is empty.
    async fn latest_message(&self, channel_id: &str) -> Result<Option<LatestMessage>, ApiError>;

    async fn leave_channel(&self, channel_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSlackApi {
    settings: SlackSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestSlackApi {
    pub fn new(settings: SlackSettings) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn endpoint(&self, method: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(method)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        http_method: Method,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(method, params)?;
        let response = self
            .client
            .request(http_method, url)
            .bearer_auth(&self.settings.token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            return Err(ApiError::rate_limited(retry_after));
        }
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{method}: {status}"),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, format!("{method}: {err}")))?;
        if !envelope.ok {
            let code = envelope.error.unwrap_or_else(|| "unknown".to_string());
            if code == "ratelimited" || code == "rate_limited" {
                return Err(ApiError::rate_limited(None));
            }
            return Err(ApiError::new(
                FailureKind::Api { code: code.clone() },
                format!("{method} failed: {code}"),
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, format!("{method}: {err}")))
    }
}

#[async_trait::async_trait]
impl SlackApi for ReqwestSlackApi {
    async fn list_channels(&self, request: &ListRequest) -> Result<ChannelPage, ApiError> {
        let types = request
            .types
            .iter()
            .map(|visibility| visibility.api_type())
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![
            ("limit", request.limit.to_string()),
            ("exclude_archived", request.exclude_archived.to_string()),
            ("types", types),
        ];
        if let Some(cursor) = request.cursor.as_ref().filter(|cursor| !cursor.is_end()) {
            params.push(("cursor", cursor.as_str().to_string()));
        }

        let response: ListResponse = self
            .call(Method::GET, "conversations.list", &params)
            .await?;
        Ok(response.into_page())
    }

    async fn latest_message(&self, channel_id: &str) -> Result<Option<LatestMessage>, ApiError> {
        let params = [("channel", channel_id.to_string()), ("limit", "1".to_string())];
        let response: HistoryResponse = self
            .call(Method::GET, "conversations.history", &params)
            .await?;
        Ok(response
            .messages
            .into_iter()
            .next()
            .map(|message| LatestMessage { ts: message.ts }))
    }

    async fn leave_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        let params = [("channel", channel_id.to_string())];
        let _: serde_json::Value = self
            .call(Method::POST, "conversations.leave", &params)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    channels: Vec<RawChannel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

impl ListResponse {
    fn into_page(self) -> ChannelPage {
        let next_cursor = self
            .response_metadata
            .map(|meta| Cursor::new(meta.next_cursor))
            .unwrap_or_default();
        let candidates = self
            .channels
            .into_iter()
            .map(|raw| ChannelCandidate {
                id: raw.id,
                name: raw.name,
                is_member: raw.is_member,
                visibility: if raw.is_private {
                    Visibility::Private
                } else {
                    Visibility::Public
                },
            })
            .collect();
        ChannelPage {
            candidates,
            next_cursor,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_member: bool,
    #[serde(default)]
    is_private: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    ts: String,
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    // `Url::join` drops the last segment unless the base ends with a slash.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
}

/// Negative delays are clamped to zero; the retry policy turns zero into
/// its default backoff.
fn parse_retry_after(raw: &str) -> Option<Duration> {
    let seconds: i64 = raw.trim().parse().ok()?;
    Some(Duration::from_secs(seconds.max(0) as u64))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
