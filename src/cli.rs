//! CLI helper functions

use crate::{
    config::{ConfigSource, TapConfig, settings_schema},
    singer::{Catalog, SingerWriter, State},
    tap::{SyncSummary, Tap},
};
use eyre::{Context, Result, bail};
use serde_json::{Value, json};
use std::io::Write;
use std::path::Path;

pub const TAP_NAME: &str = "tap-pingdom";

/// Load the tap configuration from `--config` sources
///
/// Each source is a JSON file, or `ENV` for these environment variables:
/// - TAP_PINGDOM_TOKEN: Pingdom API token (required)
/// - TAP_PINGDOM_START_DATE: Earliest date to sync from (optional)
/// - TAP_PINGDOM_API_URL: API base URL (optional)
/// - TAP_PINGDOM_USER_AGENT: User-Agent header (optional)
///
/// With no sources at all, the environment is used.
pub fn load_config(sources: &[ConfigSource]) -> Result<TapConfig> {
    let config = match sources.is_empty() {
        true => TapConfig::load(&[ConfigSource::Env]),
        false => TapConfig::load(sources),
    };
    config.context("Failed to load tap configuration")
}

/// Tap metadata printed by `--about`
pub fn about() -> Value {
    json!({
        "name": TAP_NAME,
        "description": "Singer tap for Pingdom",
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": ["catalog", "discover", "state", "about"],
        "settings": settings_schema(),
    })
}

/// Print the tap metadata
pub fn run_about(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(&about())?)?;
    Ok(())
}

/// Print the discovery catalog
pub fn run_discover(config: TapConfig, out: &mut impl Write) -> Result<Catalog> {
    let tap = Tap::new(config)?;
    let catalog = tap.discover()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&catalog)?)?;
    log::info!("✓ Discovered {} stream(s)", catalog.streams.len());
    Ok(catalog)
}

/// Sync selected streams to `writer`
///
/// Pipeline per stream: StreamExtractor → RecordTransformer → RecordLoader,
/// with child streams run once per parent record.
///
/// # Errors
/// Fails on authentication errors, and after the run if any stream failed.
pub async fn run_sync<W: Write + Send>(
    config: TapConfig,
    catalog: Option<&Path>,
    state: Option<&Path>,
    writer: &SingerWriter<W>,
) -> Result<SyncSummary> {
    let mut tap = Tap::new(config)?;

    if let Some(path) = catalog {
        log::info!("Loading catalog from {}", path.display());
        tap = tap.with_catalog(Catalog::read(path)?);
    }
    if let Some(path) = state {
        log::info!("Loading state from {}", path.display());
        tap = tap.with_state(State::read(path)?);
    }

    let summary = tap.sync(writer).await?;
    if !summary.is_success() {
        bail!(
            "{} stream(s) failed: {}",
            summary.failed.len(),
            summary.failed.join(", ")
        );
    }
    Ok(summary)
}
