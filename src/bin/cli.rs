//! Content Monitor CLI
//!
//! Local execution entry point for checking monitors and managing them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use monitor::{
    config::load_all,
    crawler::LocalCrawlerFactory,
    error::Result,
    models::{ContentItem, ContentType, SourceKey},
    monitor::CheckOptions,
    pipeline,
    storage::{LocalStorage, MonitorStorage},
};

/// Content Monitor - detect new items on organisation pages and channels
#[derive(Parser, Debug)]
#[command(name = "monitor", version, about = "Organisation content monitor")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Directory that relative paths in the configuration start from
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every monitor once
    Check {
        /// Override the configured maximum number of items per source
        #[arg(long)]
        max_results: Option<usize>,

        /// Do not reuse detail lookups (disables future video filtering)
        #[arg(long)]
        no_cache: bool,

        /// Log every fetched teaser
        #[arg(long)]
        debug: bool,
    },

    /// Start monitoring a configured page or channel
    Add {
        #[arg(long)]
        code: String,
        /// publication or video
        #[arg(long = "type")]
        content_type: ContentType,
        #[arg(long)]
        name: String,
    },

    /// Queue a pushed video on a channel monitor
    Subscribe {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        /// Published timestamp in unix seconds
        #[arg(long, default_value_t = 0)]
        published: i64,
    },

    /// Validate configuration and organisation files
    Validate,

    /// Show stored monitors
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, registry) = load_all(&cli.config, &cli.base_dir)?;
    log::debug!(
        "Loaded {} organisations from {}",
        registry.len(),
        config.paths.organisations_dir.display()
    );

    let storage = LocalStorage::new(&config.paths.storage_dir);

    match cli.command {
        Command::Check {
            max_results,
            no_cache,
            debug,
        } => {
            let mut options = CheckOptions::from(&config.checker);
            if let Some(max_results) = max_results {
                options.max_results = max_results.max(1);
            }
            options.use_cache = options.use_cache && !no_cache;
            options.debug = debug;

            let crawlers = LocalCrawlerFactory::new(&config.paths.listings_dir);
            let outcome =
                pipeline::run_checks(&config, &registry, &crawlers, &storage, &options).await?;

            for report in &outcome.reports {
                log::info!(
                    "{}: {} items, {} changes",
                    report.key,
                    report.item_count,
                    report.diff.change_count()
                );
            }
        }

        Command::Add {
            code,
            content_type,
            name,
        } => {
            let key = SourceKey::new(code, content_type, name);
            pipeline::add_monitor(&registry, &storage, &key).await?;
        }

        Command::Subscribe {
            code,
            name,
            id,
            title,
            published,
        } => {
            let key = SourceKey::new(code, ContentType::Video, name);
            let item = ContentItem::new(id, title).with_published(published);
            pipeline::subscribe(&storage, &key, item).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config, &registry)?;
            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", storage.root_dir().display());
            let monitors = storage.load_monitors().await?;
            if monitors.is_empty() {
                log::info!("No monitors yet.");
            }
            for monitor in &monitors {
                let snapshot = storage.load_snapshot(&monitor.key()).await?;
                log::info!(
                    "{} \"{}\" {} | {} items, last check {}, {} pending",
                    monitor.key(),
                    monitor.title(),
                    monitor.url(),
                    snapshot.as_ref().map_or(0, |s| s.len()),
                    snapshot
                        .as_ref()
                        .map_or_else(|| "never".to_string(), |s| s.taken_at().to_rfc3339()),
                    monitor.subscribed().len()
                );
            }
        }
    }

    Ok(())
}
