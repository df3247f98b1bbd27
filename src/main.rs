use clap::{Parser, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tap_pingdom::cli;
use tap_pingdom::config::ConfigSource;
use tap_pingdom::singer::SingerWriter;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// tap-pingdom: a Singer tap that pulls checks, alerts, contacts and results out of Pingdom
#[derive(Parser)]
#[command(name = "tap-pingdom", version, styles = STYLES)]
struct Cli {
    /// Config JSON file, or ENV to read TAP_PINGDOM_* variables; may be repeated
    #[arg(short, long, value_name = "FILE|ENV")]
    config: Vec<ConfigSource>,

    /// Print the catalog of available streams
    #[arg(short, long, conflicts_with_all = ["about", "catalog"])]
    discover: bool,

    /// Print tap metadata and the settings schema
    #[arg(long, conflicts_with = "catalog")]
    about: bool,

    /// Catalog file selecting streams and properties to sync
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// State file with bookmarks from a previous run
    #[arg(short, long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// The dotenv file to source credentials from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = dotenvy::from_filename(&cli.env) {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if cli.about {
        return cli::run_about(&mut std::io::stdout());
    }

    let config = cli::load_config(&cli.config)?;
    log::debug!("Loaded {:?}", config);

    if cli.discover {
        log::info!("Discovering streams");
        cli::run_discover(config, &mut std::io::stdout())?;
        return Ok(());
    }

    log::info!(
        "Syncing from {}{}",
        config.api_url.as_str().bright_black(),
        match &cli.catalog {
            Some(path) => format!(" with catalog {}", path.display()),
            None => String::new(),
        }
    );
    let writer = SingerWriter::stdout();
    let summary =
        cli::run_sync(config, cli.catalog.as_deref(), cli.state.as_deref(), &writer).await?;
    for (stream, count) in &summary.records {
        log::info!("{}: {} record(s)", stream.cyan(), count);
    }

    Ok(())
}
