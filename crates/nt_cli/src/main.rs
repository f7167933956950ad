use anyhow::{bail, Context};
use clap::Parser;
use nt_client::RemoteArticleClient;
use nt_core::{ArticleId, ArticleSource, ClientConfig, FilterCriteria, Sentiment, SortOrder};
use nt_view::{ArticleDetailView, ArticleListView, FetchState, FilterDraft};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod app;
mod logging;
mod terminal;
mod ui;

use logging::{init_logging, LogTarget};

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse analyzed news articles", long_about = None)]
pub struct Cli {
    /// Base URL of the news analysis service [default: $NT_API_BASE_URL or http://localhost:8000]
    #[arg(long)]
    api_base_url: Option<String>,
    /// Request timeout in seconds [default: $NT_API_TIMEOUT_SECS or 10]
    #[arg(long)]
    timeout: Option<u64>,
    /// Append logs to this file (the browser logs nothing without it)
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Open the interactive browser (default)
    Browse {
        /// Filter address to start from, e.g. "q=climate&sentiment=negative"
        address: Option<String>,
    },
    /// Print one page of articles and exit
    List {
        /// Filter address to start from; flags below override it
        address: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print a single article
    Show {
        id: String,
        /// Also fetch and print the article's analysis
        #[arg(long)]
        analysis: bool,
    },
    /// Print the canonical address for a set of filters
    Address {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Free-text search
    #[arg(long)]
    q: Option<String>,
    #[arg(long, value_parser = ["any", "positive", "neutral", "negative"])]
    sentiment: Option<String>,
    #[arg(long)]
    source: Option<String>,
    /// Earliest publish date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// Latest publish date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    #[arg(long, value_parser = ["published_desc", "score_desc"])]
    sort: Option<String>,
}

impl FilterArgs {
    /// Layers the flags over `base` and validates the result the same way
    /// the filter form does.
    fn apply(self, base: &FilterCriteria) -> anyhow::Result<FilterCriteria> {
        let mut draft = FilterDraft::from_criteria(base);
        if let Some(q) = self.q {
            draft.query = q;
        }
        if let Some(sentiment) = self.sentiment {
            draft.sentiment = Sentiment::from_param(&sentiment);
        }
        if let Some(source) = self.source {
            draft.source = source;
        }
        if let Some(from) = self.from {
            draft.date_from = from;
        }
        if let Some(to) = self.to {
            draft.date_to = to;
        }
        if let Some(sort) = self.sort {
            draft.sort = SortOrder::from_param(&sort);
        }
        Ok(draft.to_criteria()?)
    }
}

/// Environment first, then flags on top.
fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.api_base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn build_source(cli: &Cli) -> anyhow::Result<Arc<dyn ArticleSource>> {
    let config = client_config(cli)?;
    info!("🌐 Using news service at {}", config.base_url);
    let client = RemoteArticleClient::new(config)?;
    Ok(Arc::new(client))
}

async fn list(source: Arc<dyn ArticleSource>, criteria: FilterCriteria) -> anyhow::Result<()> {
    println!("?{}", criteria.encode());
    let mut view = ArticleListView::new(source);
    view.load(&criteria).await;
    print!("{}", view.render().to_text());
    if let FetchState::Failure(error) = view.state() {
        bail!("{}", error.message());
    }
    Ok(())
}

async fn show(source: Arc<dyn ArticleSource>, id: ArticleId, with_analysis: bool) -> anyhow::Result<()> {
    let mut view = ArticleDetailView::new(source);
    view.load(id).await;
    if with_analysis && view.article().data().is_some() {
        view.load_analysis_now().await;
    }
    print!("{}", view.render().to_text());
    if let FetchState::Failure(error) = view.article() {
        bail!("{}", error.message());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Browse { .. }));
    let target = match (&cli.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    };
    init_logging(cli.verbose, target).context("failed to initialize logging")?;

    let command = cli.command.take().unwrap_or(Commands::Browse { address: None });
    match command {
        Commands::Browse { address } => {
            let source = build_source(&cli)?;
            terminal::run(source, address.as_deref().unwrap_or_default()).await?;
        }
        Commands::List { address, filters } => {
            let base = FilterCriteria::decode(address.as_deref().unwrap_or_default());
            let criteria = filters.apply(&base)?;
            list(build_source(&cli)?, criteria).await?;
        }
        Commands::Show { id, analysis } => {
            let id: ArticleId = id.parse()?;
            show(build_source(&cli)?, id, analysis).await?;
        }
        Commands::Address { filters } => {
            let criteria = filters.apply(&FilterCriteria::default())?;
            println!("?{}", criteria.encode());
        }
    }

    Ok(())
}
