use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::{ChannelCandidate, Visibility};

/// Names excluded from every run, regardless of activity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkipFilter {
    names: HashSet<String>,
}

impl SkipFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn should_skip(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The staleness boundary: activity strictly before it counts as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn days_before(now: DateTime<Utc>, days: u32) -> Self {
        let instant = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self(instant)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn is_stale(&self, last_activity: DateTime<Utc>) -> bool {
        last_activity < self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotMember,
    SkipListed,
    KeywordMismatch,
}

/// What the coordinator should do with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Skip(SkipReason),
    /// Date filter active: activity must be probed before accepting.
    Probe,
    /// No date filter: accept without a timestamp.
    Accept,
}

/// Everything a discovery run filters on. Built once per run and shared
/// read-only by every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    pub skip: SkipFilter,
    pub keyword: String,
    pub cutoff: Option<Cutoff>,
    pub types: Vec<Visibility>,
}

impl Criteria {
    pub fn new(skip: SkipFilter) -> Self {
        Self {
            skip,
            keyword: String::new(),
            cutoff: None,
            types: Visibility::ALL.to_vec(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_cutoff(mut self, cutoff: Option<Cutoff>) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_types(mut self, types: Vec<Visibility>) -> Self {
        self.types = if types.is_empty() {
            Visibility::ALL.to_vec()
        } else {
            types
        };
        self
    }

    pub fn date_filter_active(&self) -> bool {
        self.cutoff.is_some()
    }

    /// Membership, skip list and keyword checks, in that order.
    pub fn admit(&self, candidate: &ChannelCandidate) -> Admission {
        if !candidate.is_member {
            return Admission::Skip(SkipReason::NotMember);
        }
        if self.skip.should_skip(&candidate.name) {
            return Admission::Skip(SkipReason::SkipListed);
        }
        if !self.keyword.is_empty() && !candidate.name.contains(&self.keyword) {
            return Admission::Skip(SkipReason::KeywordMismatch);
        }
        if self.date_filter_active() {
            Admission::Probe
        } else {
            Admission::Accept
        }
    }
}
