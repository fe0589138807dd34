//! Main entry point for the season-streamer daemon.

use clap::Parser;
use log::{debug, error, info, warn};
use season_streamer::catalog::Catalog;
use season_streamer::config::Config;
use season_streamer::encoder::FfmpegLauncher;
use season_streamer::library::{CatalogSource, DirectorySource, TableSource};
use season_streamer::outbox::{self, ConsoleSink, Outbox, ReplySink, WebhookSink};
use season_streamer::render;
use season_streamer::sequencer::Sequencer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Command-line arguments for season-streamer.
#[derive(Parser, Debug)]
#[command(
    name = "season-streamer",
    version,
    about = "Continuous show/season/episode streaming with chat commands",
    long_about = "Streams a library of shows episode after episode to a single output, \
                  reading $-commands from stdin to navigate, stop and resume."
)]
struct Args {
    /// Library directory laid out as <Show>/<Season>/<episode>
    #[arg(short = 'd', long)]
    library_dir: Option<String>,

    /// Static TOML library table
    #[arg(short = 'f', long)]
    library_file: Option<String>,

    /// Output URL (e.g. rtmp://host/app/key)
    #[arg(short, long)]
    output: Option<String>,

    /// Chat webhook that receives replies
    #[arg(short, long)]
    webhook: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 2)]
    log: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    if args.init_config {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => Config::get_config_path()?,
        };
        let path = Config::create_default_if_missing(&config_path)?;
        println!("Config file: {}", path.display());
        return Ok(());
    }

    // Load config
    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if args.library_dir.is_some() {
        config.library_dir = args.library_dir.clone();
    }
    if args.library_file.is_some() {
        config.library_file = args.library_file.clone();
    }
    if let Some(output) = &args.output {
        config.output_url = output.clone();
    }
    if args.webhook.is_some() {
        config.webhook_url = args.webhook.clone();
    }

    let source: Arc<dyn CatalogSource> = match (&config.library_dir, &config.library_file) {
        (Some(dir), _) => Arc::new(DirectorySource::new(dir)),
        (None, Some(file)) => Arc::new(TableSource::new(file)),
        (None, None) => {
            eprintln!("Error: no library configured. Use --library-dir or --library-file.");
            std::process::exit(1);
        }
    };

    let catalog = match source.enumerate().and_then(Catalog::build) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: could not load library: {}", e);
            std::process::exit(1);
        }
    };
    let shape = catalog.shape();
    info!(
        "Library loaded: {} shows, {} seasons, {} episodes",
        shape.shows, shape.seasons, shape.episodes
    );

    let sink: Arc<dyn ReplySink> = match &config.webhook_url {
        Some(url) => {
            info!("Sending replies to webhook");
            Arc::new(WebhookSink::new(url))
        }
        None => Arc::new(ConsoleSink),
    };
    let (outbox, outbox_rx) = Outbox::new();
    outbox::spawn_delivery(outbox_rx, sink);
    outbox::spawn_announcements(
        outbox.clone(),
        render::GREETING,
        render::REMINDER,
        Duration::from_secs(config.greeting_delay_secs),
        Duration::from_secs(config.reminder_minutes * 60),
    );

    let launcher = Arc::new(FfmpegLauncher {
        program: config.encoder.clone(),
        output_url: config.output_url.clone(),
        output_format: config.output_format.clone(),
        extra_args: config.extra_args.clone(),
    });
    info!("Streaming to {} via {}", config.output_url, config.encoder);

    let mut sequencer = Sequencer::new(
        catalog,
        source,
        launcher,
        config.quality.clone(),
        config.timing(),
        outbox,
    )?;

    // Command transport: one command per stdin line
    let handle = sequencer.handle();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if !handle.command(line) {
                        break;
                    }
                }
                Ok(None) => {
                    info!("stdin closed, no more commands will be read");
                    break;
                }
                Err(e) => {
                    error!("Failed to read command: {}", e);
                    break;
                }
            }
        }
    });

    if config.autostart {
        sequencer.start();
    }

    sequencer.run().await;
    Ok(())
}
