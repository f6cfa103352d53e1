use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hina_diary::config::{self, DiaryConfig};
use hina_diary::diary::{import_batch, DiaryStore, Id, LineOutcome};
use hina_diary::logging;
use hina_diary::maps::MapsUrlResolver;
use std::io::Read;
use std::path::PathBuf;

/// Hina Travel Diary: journeys, itineraries and Google Maps link import.
///
/// Examples:
///   hina resolve "https://maps.app.goo.gl/abc123"
///   hina import --itinerary 3 links.txt
///   pbpaste | hina import --itinerary 3
///   hina serve --port 8080
#[derive(Parser)]
#[command(name = "hina", version, about, long_about = None)]
struct Cli {
    /// Config file. Defaults to <config dir>/hina/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Google Maps API key (overrides config and GOOGLE_MAPS_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a Google Maps link and print the places as JSON.
    Resolve {
        url: String,
    },
    /// Import one Google Maps link per line into an itinerary.
    Import {
        /// Target itinerary id.
        #[arg(long)]
        itinerary: Id,
        /// File with links. Reads stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match run(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<DiaryConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_or_init_from(path)?,
        None => config::load_or_init()?,
    };
    if let Some(key) = &cli.api_key {
        cfg.maps.api_key = Some(key.clone());
    }
    if cfg.maps.api_key.is_none() {
        tracing::warn!("no Google Maps API key configured; place lookups are disabled");
    }
    Ok(cfg)
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = load_config(&cli)?;

    match cli.command {
        Command::Resolve { url } => {
            let resolver = MapsUrlResolver::new(&cfg.maps);
            let places = resolver.resolve_all(&url)?;
            if places.is_empty() {
                eprintln!("No place found for {url}");
                return Ok(1);
            }
            println!("{}", serde_json::to_string_pretty(&places)?);
            Ok(0)
        }

        Command::Import { itinerary, file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
                    buf
                }
            };

            let mut store = DiaryStore::load_from(cfg.data_file())?;
            let title = store.itinerary(itinerary)?.title.clone();
            if text.trim().is_empty() {
                bail!("no links given");
            }

            let resolver = MapsUrlResolver::new(&cfg.maps);
            let report = import_batch(&resolver, &text);
            for line in &report.lines {
                match &line.outcome {
                    LineOutcome::Resolved(n) => println!("  {:>3}  ok      {} place(s)  {}", line.line, n, line.url),
                    LineOutcome::Unresolved => println!("  {:>3}  missed  {}", line.line, line.url),
                    LineOutcome::Failed(e) => println!("  {:>3}  failed  {}  ({e})", line.line, line.url),
                }
            }

            let count = report.drafts.len();
            let resolved = report.resolved_lines();
            for draft in report.drafts {
                store.create_location(itinerary, draft.into_input())?;
            }
            println!(
                "Saved {count} location(s) to '{title}' ({resolved}/{} links resolved).",
                report.lines.len()
            );
            Ok(0)
        }

        Command::Serve { host, port } => {
            let host = host.unwrap_or(cfg.server.host.clone());
            let port = port.unwrap_or(cfg.server.port);
            let store = DiaryStore::load_from(cfg.data_file())?;
            let resolver = MapsUrlResolver::new(&cfg.maps);

            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(hina_diary::server::start(&host, port, store, resolver))?;
            Ok(0)
        }
    }
}
