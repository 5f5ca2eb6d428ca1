//! strata-worker: runs the sync engine against the configured repository
//! and index.
//!
//! ```text
//! strata-worker                         # drain the queue until Ctrl-C
//! strata-worker recrawl <path> [flags]  # queue a subtree, then exit
//! ```
//!
//! Config is read from `--config` or `$STRATA_CONFIG` (default
//! `strata.toml`); a missing file means all defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use strata_core::config::IndexMode;
use strata_core::paths::expand_iri;
use strata_core::traits::{EventQueue, IndexSink, Repository, StatusLedger};
use strata_core::StrataConfig;
use strata_storage::StorageEngine;
use strata_sync::sinks::{DirectIndexSink, StoreIndexSink};
use strata_sync::transport::HttpRepository;
use strata_sync::{
    ConfiguredWorkflows, CrawlOptions, ModelRegistry, RecrawlRequest, Recrawler, SyncContext,
    SyncEngine,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file
    #[arg(long, value_name = "PATH", default_value = "strata.toml")]
    #[arg(env = "STRATA_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the queue until interrupted (the default)
    Run,
    /// Queue reindex events for a subtree, then exit
    Recrawl(RecrawlArgs),
}

#[derive(Debug, Args)]
struct RecrawlArgs {
    /// Start path, repository-relative or absolute
    path: String,

    /// Overwrite pending events instead of leaving them in place
    #[arg(long)]
    force: bool,

    /// Relations to traverse besides containment (compact IRIs allowed)
    #[arg(long, value_name = "RELATION", value_delimiter = ',')]
    follow: Vec<String>,

    /// Only queue the start path
    #[arg(long)]
    no_crawl: bool,

    /// Index name carried by every queued event
    #[arg(long, value_name = "INDEX")]
    write_index: Option<String>,

    /// Treat the start path as a binary
    #[arg(long)]
    is_binary: bool,

    /// Stop expanding below this depth
    #[arg(long, value_name = "N")]
    depth: Option<usize>,
}

impl RecrawlArgs {
    fn into_request(self) -> RecrawlRequest {
        let options = CrawlOptions {
            follow: self.follow.iter().map(|r| expand_iri(r.trim())).collect(),
            force: self.force,
            no_crawl: self.no_crawl,
            write_index: self.write_index.filter(|index| !index.is_empty()),
            is_binary: self.is_binary,
            max_depth: self.depth,
        };
        RecrawlRequest::new(self.path, options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    strata_observability::init_tracing(&config.observability);

    let storage = Arc::new(
        StorageEngine::open(std::path::Path::new(&config.storage.db_path), &config.storage)
            .context("opening storage")?,
    );
    let repository: Arc<dyn Repository> = Arc::new(HttpRepository::new(&config.repository)?);
    let queue: Arc<dyn EventQueue> = storage.clone();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_engine(&config, storage, queue, repository).await,
        Command::Recrawl(args) => {
            let request = args.into_request();
            let crawler = Recrawler::new(queue, repository, &config.crawl, &config.repository.base_url);
            let report = crawler.crawl(&request.path, &request.options).await?;
            tracing::info!(
                visited = report.visited,
                emitted = report.emitted,
                skipped = report.skipped,
                failed = report.failed,
                "recrawl queued"
            );
            Ok(())
        }
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<StrataConfig> {
    if !path.exists() {
        return Ok(StrataConfig::default());
    }
    StrataConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

async fn run_engine(
    config: &StrataConfig,
    storage: Arc<StorageEngine>,
    queue: Arc<dyn EventQueue>,
    repository: Arc<dyn Repository>,
) -> anyhow::Result<()> {
    let models = Arc::new(ModelRegistry::from_config(&config.models));
    let sink: Arc<dyn IndexSink> = match config.index.mode {
        IndexMode::Direct => Arc::new(DirectIndexSink::new(
            &config.index,
            models.names_for_channel(DirectIndexSink::CHANNEL),
        )?),
        IndexMode::Store => Arc::new(StoreIndexSink::new(storage.clone())),
    };
    if models.is_empty() {
        tracing::warn!("no models configured; every event will be ignored");
    } else if models.names_for_channel(sink.channel()).is_empty() {
        tracing::warn!(channel = %sink.channel(), "no models sync over this channel");
    }
    tracing::info!(models = models.len(), channel = %sink.channel(), "engine starting");

    let ledger: Arc<dyn StatusLedger> = storage;
    let ctx = SyncContext {
        queue,
        ledger,
        repository,
        sink,
        models,
        workflows: Arc::new(ConfiguredWorkflows::new(config.workflows.clone())),
    };
    let engine = SyncEngine::new(ctx, &config.engine);
    engine
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
