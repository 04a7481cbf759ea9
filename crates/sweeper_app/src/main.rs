mod config;
mod progress;
mod prompt;
mod report;
mod skip_list;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_debug, engine_info};
use sweeper_core::{Criteria, Visibility};
use sweeper_engine::{DiscoverySettings, Sweeper};

use crate::config::{Cli, RunConfig};
use crate::progress::LogProgressSink;
use crate::skip_list::load_skip_list;

fn main() -> Result<()> {
    // A missing .env is fine; the token may come from the environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    engine_logging::initialize(&cli.log_options());

    let config = cli.into_run_config()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run(config))
}

async fn run(config: RunConfig) -> Result<()> {
    let skip = load_skip_list(&config.skip_file);
    let sweeper = Sweeper::connect(
        config.slack,
        Arc::new(LogProgressSink),
        DiscoverySettings::default(),
    )?;

    let criteria = Criteria::new(skip)
        .with_keyword(config.keyword)
        .with_cutoff(sweeper.cutoff_for_days(config.days))
        .with_types(config.types);
    log_criteria(&criteria);

    engine_info!("Fetching channels...");
    let discovery = sweeper.discover(criteria).await?;
    engine_debug!("Discovery finished: {:?}", discovery.summary);

    let mut channels = discovery.channels;
    if channels.is_empty() {
        println!("No channels found matching criteria.");
        return Ok(());
    }
    report::sort_channels(&mut channels);
    print!("{}", report::render_matches(&channels));

    let agreed = prompt::confirm(io::stdin().lock(), io::stdout()).context("failed to read answer")?;
    if !agreed {
        println!("No channels were left.");
        return Ok(());
    }

    let outcome = sweeper.leave(&channels).await;
    println!("{}", report::render_leave_summary(&outcome));
    Ok(())
}

fn log_criteria(criteria: &Criteria) {
    if let Some(cutoff) = criteria.cutoff {
        engine_debug!("Cutoff date: {}", cutoff.instant().to_rfc2822());
    }
    if !criteria.keyword.is_empty() {
        engine_debug!("Keyword filter: {}", criteria.keyword);
    }
    engine_debug!("Channel types: {}", describe_types(&criteria.types));
}

fn describe_types(types: &[Visibility]) -> String {
    types
        .iter()
        .map(|visibility| visibility.api_type())
        .collect::<Vec<_>>()
        .join(",")
}
