//! Skip-list loading: `{"skip_channels": [...]}` with a built-in fallback.

use std::fs;
use std::path::Path;

use engine_logging::{engine_info, engine_warn};
use serde::Deserialize;
use sweeper_core::SkipFilter;
use thiserror::Error;

pub const DEFAULT_SKIP_FILE: &str = "skip-channels.json";

/// Used whenever the skip-list file is missing or unreadable.
pub const DEFAULT_SKIP_CHANNELS: [&str; 20] = [
    "general",
    "company-announcements",
    "team-leads",
    "support-team",
    "dev-team",
    "infrastructure",
    "security",
    "hr-announcements",
    "product-updates",
    "sales-team",
    "marketing-team",
    "customer-support",
    "emergency-alerts",
    "system-notifications",
    "admin-only",
    "executive-team",
    "board-meetings",
    "legal-team",
    "finance-team",
    "compliance",
];

#[derive(Debug, Error)]
pub enum SkipListError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct SkipListFile {
    #[serde(default)]
    skip_channels: Vec<String>,
}

pub fn read_skip_list(path: &Path) -> Result<SkipFilter, SkipListError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| SkipListError::Read {
        path: display.clone(),
        source,
    })?;
    let file: SkipListFile =
        serde_json::from_str(&content).map_err(|source| SkipListError::Parse {
            path: display,
            source,
        })?;
    Ok(SkipFilter::new(file.skip_channels))
}

pub fn default_skip_list() -> SkipFilter {
    SkipFilter::new(DEFAULT_SKIP_CHANNELS)
}

/// Reads the skip list, falling back to the defaults with a warning.
pub fn load_skip_list(path: &Path) -> SkipFilter {
    match read_skip_list(path) {
        Ok(filter) => {
            if !filter.is_empty() {
                engine_info!("Loaded {} channels to skip from {}", filter.len(), path.display());
            }
            filter
        }
        Err(err) => {
            engine_warn!("{}, using default skip list", err);
            default_skip_list()
        }
    }
}
