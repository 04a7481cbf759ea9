use std::path::PathBuf;

use clap::Parser;
use engine_logging::LogOptions;
use sweeper_core::Visibility;
use sweeper_engine::{SlackSettings, DEFAULT_BASE_URL};
use thiserror::Error;

use crate::skip_list::DEFAULT_SKIP_FILE;

#[derive(Debug, Parser)]
#[command(
    name = "channel-sweeper",
    version,
    about = "Find stale or keyword-matching Slack channels and leave them"
)]
pub struct Cli {
    /// Filter channels with last activity older than this many days
    #[arg(long, default_value_t = 0)]
    pub days: u32,

    /// Filter channels whose names contain this keyword (case-sensitive)
    #[arg(long, default_value = "")]
    pub keyword: String,

    /// Channel types to include: public, private or both (comma-separated)
    #[arg(long, default_value = "public,private")]
    pub types: String,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// JSON file listing channels that are never touched
    #[arg(long, default_value = DEFAULT_SKIP_FILE)]
    pub skip_file: PathBuf,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Bot or user token with channels:read/history and channels:write scopes
    #[arg(long, env = "SLACK_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, hide = true, default_value = DEFAULT_BASE_URL)]
    pub api_base: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You must provide either --days or --keyword")]
    NoFilter,
    #[error("SLACK_API_TOKEN not set in environment or .env file")]
    MissingToken,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub days: u32,
    pub keyword: String,
    pub types: Vec<Visibility>,
    pub skip_file: PathBuf,
    pub logging: LogOptions,
    pub slack: SlackSettings,
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            verbose: self.verbose,
            log_file: self.log_file.clone(),
        }
    }

    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        if self.days == 0 && self.keyword.is_empty() {
            return Err(ConfigError::NoFilter);
        }
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?
            .to_string();

        let logging = self.log_options();
        Ok(RunConfig {
            days: self.days,
            keyword: self.keyword,
            types: Visibility::parse_list(&self.types),
            skip_file: self.skip_file,
            logging,
            slack: SlackSettings {
                base_url: self.api_base,
                ..SlackSettings::new(token)
            },
        })
    }
}
