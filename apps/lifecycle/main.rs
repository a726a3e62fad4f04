use anyhow::{Context, Result};
use chrono::Utc;
use dotenv::dotenv;
use proposalsapp_lifecycle::{OverviewMapper, TimeEstimator, categorize};
use report::{LifecycleReport, split_resolutions};
use std::{env, path::PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use utils::{
    errors::{
        CURRENT_BLOCK_INVALID, PROPOSALS_FILE_NOT_SET, SERIALIZE_REPORT_FAILED, WRITE_REPORT_FAILED,
    },
    tracing::run_with_tracing,
};

mod config;
mod input;
mod report;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    run_with_tracing(run).await
}

async fn run() -> Result<()> {
    let config = config::load();

    let proposals_path =
        PathBuf::from(env::var("PROPOSALS_FILE").context(PROPOSALS_FILE_NOT_SET)?);
    let metagov_path = match env::var("METAGOV_FILE") {
        Ok(path) if config.metagov_enabled => Some(PathBuf::from(path)),
        Ok(_) => {
            info!("Metagov overlay disabled by config, ignoring METAGOV_FILE");
            None
        }
        Err(_) => {
            if config.metagov_enabled {
                info!("METAGOV_FILE not set, categorizing on DAO state only");
            }
            None
        }
    };
    let current_block = parse_current_block(env::var("CURRENT_BLOCK").ok());

    let inputs = input::load_inputs(&proposals_path, metagov_path.as_deref()).await?;

    let now = Utc::now();
    let mapper = OverviewMapper::new(
        config.protocol_version,
        TimeEstimator::new(config.block_time_seconds),
    );
    let resolutions = mapper.to_overviews(&inputs.records, current_block, Some(now));
    let (overviews, mut unresolved) = split_resolutions(resolutions);
    unresolved.extend(inputs.rejected);

    let report = LifecycleReport {
        protocol_version: config.protocol_version,
        current_block,
        generated_at: now.timestamp(),
        categories: categorize(&overviews, inputs.metagov.as_ref()),
        unresolved,
    };

    info!(
        active = report.categories.active.len(),
        upcoming = report.categories.upcoming.len(),
        past = report.categories.past.len(),
        unresolved = report.unresolved.len(),
        "Lifecycle report ready"
    );

    let mut json = serde_json::to_vec_pretty(&report).context(SERIALIZE_REPORT_FAILED)?;
    json.push(b'\n');

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&json).await.context(WRITE_REPORT_FAILED)?;
    stdout.flush().await.context(WRITE_REPORT_FAILED)?;

    Ok(())
}

/// A missing or unreadable block number degrades resolution to the indexer status.
fn parse_current_block(value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(block) => Some(block),
        Err(err) => {
            warn!(
                value = %value,
                error = %err,
                "{}, resolving from indexer status only",
                CURRENT_BLOCK_INVALID
            );
            None
        }
    }
}
