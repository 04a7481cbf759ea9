use std::fmt;

use chrono::{DateTime, Utc};

/// Channel visibility as understood by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 2] = [Visibility::Public, Visibility::Private];

    /// Wire name used in the `types` parameter of `conversations.list`.
    pub fn api_type(self) -> &'static str {
        match self {
            Visibility::Public => "public_channel",
            Visibility::Private => "private_channel",
        }
    }

    /// Parses a user-facing name (`public` / `private`), ignoring case and
    /// surrounding whitespace.
    pub fn from_user_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    /// Parses a comma separated list. Unknown entries are ignored and an
    /// empty result falls back to every visibility.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut types: Vec<Self> = Vec::new();
        for visibility in raw.split(',').filter_map(Self::from_user_name) {
            if !types.contains(&visibility) {
                types.push(visibility);
            }
        }
        if types.is_empty() {
            types = Self::ALL.to_vec();
        }
        types
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_type())
    }
}

/// A channel as returned by one enumeration pass, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCandidate {
    pub id: String,
    pub name: String,
    pub is_member: bool,
    pub visibility: Visibility,
}

/// A channel that passed every filter and belongs in the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ChannelInfo {
    pub fn from_candidate(candidate: &ChannelCandidate, last_activity: Option<DateTime<Utc>>) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            last_activity,
        }
    }
}

/// Opaque pagination token. An empty token marks the end of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only an empty token ends the listing; any other value is passed back verbatim.
    pub fn is_end(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses a message timestamp such as `"1700000000.000200"`.
///
/// The fractional part is dropped; anything that is not a finite,
/// representable number of seconds yields `None`.
pub fn parse_message_ts(raw: &str) -> Option<DateTime<Utc>> {
    let seconds: f64 = raw.trim().parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slack_timestamps() {
        let ts = parse_message_ts("1700000000.000200").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert!(parse_message_ts("not-a-number").is_none());
        assert!(parse_message_ts("").is_none());
        assert!(parse_message_ts("NaN").is_none());
    }

    #[test]
    fn only_an_empty_cursor_ends_the_listing() {
        assert!(Cursor::default().is_end());
        assert!(Cursor::new("").is_end());
        assert!(!Cursor::new(" ").is_end());
        assert!(!Cursor::new("dXNlcjpVMDYx").is_end());
    }

    #[test]
    fn visibility_list_falls_back_to_all() {
        assert_eq!(Visibility::parse_list(" Private "), vec![Visibility::Private]);
        assert_eq!(Visibility::parse_list("dm,group"), Visibility::ALL.to_vec());
        assert_eq!(
            Visibility::parse_list("public,public,private"),
            vec![Visibility::Public, Visibility::Private]
        );
    }
}
