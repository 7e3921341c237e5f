//! ScienceBase web link annotator
//!
//! Checks the web links of catalog items and prints the annotated JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sciencebase_weblinks::{
    CatalogConfig, FetchConfig, FilterMode, ItemRequest, LinkAnnotator, LinkFilter,
    ScienceBaseClient, WebLinkBatch, DEFAULT_CATALOG_URL,
};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, info};

/// ScienceBase web link annotator
#[derive(Parser, Debug)]
#[command(name = "sb-weblinks")]
#[command(version)]
#[command(about = "Fetch, classify and annotate ScienceBase item web links")]
struct Args {
    /// Catalog root URL
    #[arg(long, env = "SB_CATALOG_URL", default_value = DEFAULT_CATALOG_URL, global = true)]
    catalog_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// User agent sent with every request
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List an item's web links, narrowed by type and title
    Links {
        /// Catalog item id
        item_id: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Annotate the web links of a catalog item
    Item {
        /// Catalog item id
        item_id: String,

        /// Item fields to fetch
        #[arg(long, default_value = "webLinks")]
        fields: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// How the type/title filter selects links for annotation
        #[arg(long, value_enum, default_value_t = Mode::Include)]
        mode: Mode,
    },

    /// Annotate a link or list of links read as JSON
    Annotate {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Exact link `type` to match
    #[arg(long)]
    link_type: Option<String>,

    /// Exact link `title` to match
    #[arg(long)]
    link_title: Option<String>,
}

impl From<FilterArgs> for LinkFilter {
    fn from(args: FilterArgs) -> Self {
        LinkFilter::new(args.link_type, args.link_title)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Annotate only links matching every criterion
    Include,
    /// Annotate every link except those matching any criterion
    Exclude,
}

impl From<Mode> for FilterMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Include => FilterMode::Include,
            Mode::Exclude => FilterMode::Exclude,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "arguments parsed");

    let timeout_ms = args.timeout_secs.saturating_mul(1000);
    let mut fetch = FetchConfig::builder().timeout_ms(timeout_ms);
    let mut catalog = CatalogConfig::with_base_url(args.catalog_url.clone());
    catalog.timeout_ms = timeout_ms;
    if let Some(ua) = &args.user_agent {
        fetch = fetch.user_agent(ua.clone());
        catalog.user_agent = ua.clone();
    }

    let client = ScienceBaseClient::new(catalog).context("failed to create catalog client")?;
    let annotator =
        LinkAnnotator::new(client, fetch.build()).context("failed to create link annotator")?;

    match args.command {
        Command::Links { item_id, filter } => {
            let links = annotator
                .fetch_web_links(&item_id, &filter.into())
                .await
                .with_context(|| format!("failed to fetch web links of {item_id}"))?;
            if links.is_none() {
                info!(%item_id, "no matching web links");
            }
            print_json(&links, args.pretty)?;
        }
        Command::Item {
            item_id,
            fields,
            filter,
            mode,
        } => {
            let request = ItemRequest::for_id(item_id.clone())
                .with_fields(fields)
                .with_filter(filter.into(), mode.into());
            let item = annotator
                .process_item(request)
                .await
                .with_context(|| format!("failed to process item {item_id}"))?;
            print_json(&item, args.pretty)?;
        }
        Command::Annotate { file } => {
            let input = read_input(file.as_ref())?;
            let batch: WebLinkBatch =
                serde_json::from_str(&input).context("input is not a web link or list of web links")?;
            info!(links = batch.len(), "annotating web links");
            let annotated = annotator.process_web_links(batch).await;
            print_json(&annotated, args.pretty)?;
        }
    }

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
