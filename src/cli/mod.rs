//! CLI command handling

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;

use pizarra::config::defaults::INFLATION_URL;
use pizarra::config::{Config, SourceConfig};
use pizarra::html;
use pizarra::services::normalizer::format_amount;
use pizarra::services::{
    inflation_from_tables, month_end_closes, observations_from_tables, Board, BoardRegistry,
    MonthEndClose, MonthlyInflation, QuoteCache, QuoteCacheService,
};
use pizarra::sources::HttpFetcher;
use pizarra::types::{Provenance, QuoteSet};

/// Currency quote board with per-value fallback to last-known-good defaults
#[derive(Parser)]
#[command(name = "pizarra")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.pizarra/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show quotes for every board (default)
    Quotes {
        /// Only this board
        #[arg(long)]
        board: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Mark each value as live or fallback
        #[arg(long)]
        provenance: bool,

        /// Ignore the cache and fetch now
        #[arg(long)]
        refresh: bool,
    },

    /// List configured boards
    Boards {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Month-end closes from a historical quote table
    History {
        /// Page with the historical table
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        url: Option<String>,

        /// Local HTML file with the historical table
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly and year-to-date inflation from a CPI table
    Inflation {
        /// Page with the CPI table (default: calcularsueldo.com.ar 2025 table)
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Local HTML file with the CPI table
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage cached quotes
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove cached quotes (all boards unless --board)
    Clear {
        #[arg(long)]
        board: Option<String>,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            None => run_quotes(&config, None, false, false, false),
            Some(Commands::Quotes {
                board,
                json,
                provenance,
                refresh,
            }) => run_quotes(&config, board.as_deref(), json, provenance, refresh),
            Some(Commands::Boards { json }) => run_boards(&config, json),
            Some(Commands::History { url, file, json }) => {
                run_history(&config, url.as_deref(), file.as_deref(), json)
            }
            Some(Commands::Inflation { url, file, json }) => {
                run_inflation(&config, url.as_deref(), file.as_deref(), json)
            }
            Some(Commands::Cache {
                action: CacheAction::Clear { board },
            }) => run_cache_clear(&config, board.as_deref()),
        }
    }
}

/// One board as printed
#[derive(Serialize)]
struct BoardOutput<'a> {
    board: &'a str,
    fetched_at: DateTime<Utc>,
    quotes: &'a QuoteSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    provenance: Option<&'a BTreeMap<String, Provenance>>,
}

/// Load each selected board, cache-first unless `refresh`
fn load_boards(
    config: &Config,
    registry: &BoardRegistry,
    only: Option<&str>,
    refresh: bool,
) -> anyhow::Result<Vec<(String, QuoteCache)>> {
    let selected: Vec<&Board> = match only {
        Some(name) => match registry.get(name) {
            Some(board) => vec![board],
            None => bail!("unknown board {:?}", name),
        },
        None => registry.boards().iter().collect(),
    };

    let cache_service = match QuoteCacheService::new() {
        Ok(cs) => Some(cs),
        Err(e) => {
            log::warn!("quote cache unavailable, fetching without it: {}", e);
            None
        }
    };
    let now = Utc::now();
    let ttl = config.cache_ttl();

    let loaded = selected
        .par_iter()
        .map(|board| {
            let fetch = || board.refresh().into_cache();
            let cache = match &cache_service {
                Some(cs) if refresh => cs.store(board.name(), fetch()),
                Some(cs) => cs.load_or_refresh(board.name(), board.fallback(), now, ttl, fetch).0,
                None => fetch(),
            };
            (board.name().to_string(), cache)
        })
        .collect();

    Ok(loaded)
}

fn run_quotes(
    config: &Config,
    only: Option<&str>,
    json: bool,
    provenance: bool,
    refresh: bool,
) -> anyhow::Result<()> {
    let registry = BoardRegistry::from_config(config)?;
    let boards = load_boards(config, &registry, only, refresh)?;

    if json {
        let output: Vec<BoardOutput> = boards
            .iter()
            .map(|(name, cache)| BoardOutput {
                board: name,
                fetched_at: cache.fetched_at,
                quotes: &cache.quotes,
                provenance: provenance.then_some(&cache.provenance),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (i, (name, cache)) in boards.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", render_board(name, cache, provenance));
        }
    }
    Ok(())
}

/// Plain-text rendering of one board
fn render_board(name: &str, cache: &QuoteCache, provenance: bool) -> String {
    let mut out = format!(
        "{} (as of {})\n",
        name,
        cache.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
    let width = cache.quotes.names().map(str::len).max().unwrap_or(0);

    for (logical, value) in cache.quotes.iter() {
        let mut line = format!("  {:<width$}  {:>14}", logical, format_amount(value), width = width);
        if provenance {
            let tag = cache
                .provenance
                .get(logical)
                .copied()
                .unwrap_or(Provenance::Fallback);
            line.push_str(&format!("  [{}]", tag.label()));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn describe_source(source: &SourceConfig) -> String {
    match source {
        SourceConfig::JsonList { url, .. } => format!("json_list {}", url),
        SourceConfig::PageText { url, labels } => {
            format!("page_text {} ({} labels)", url, labels.len())
        }
        SourceConfig::HtmlTable { url, .. } => format!("html_table {}", url),
        SourceConfig::File { path, .. } => format!("file {}", path.display()),
    }
}

fn run_boards(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.boards)?);
        return Ok(());
    }
    for board in &config.boards {
        println!(
            "{}: {} [{}]",
            board.name,
            describe_source(&board.source),
            board
                .fallback
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

/// Page HTML from a local file, or fetched from `url`
fn read_page(config: &Config, url: Option<&str>, file: Option<&Path>) -> anyhow::Result<String> {
    match (url, file) {
        (_, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
        }
        (Some(url), None) => {
            let http = HttpFetcher::new(config.timeout_ms, config.system_proxy)?;
            Ok(http.get_text(url)?)
        }
        (None, None) => bail!("either --url or --file is required"),
    }
}

/// Fetch or read the page and compute month-end closes
fn load_history(config: &Config, url: Option<&str>, file: Option<&Path>) -> anyhow::Result<Vec<MonthEndClose>> {
    let page = read_page(config, url, file)?;
    let tables = html::tables(&page);
    let observations = observations_from_tables(&tables);
    if observations.is_empty() {
        return Err(pizarra::types::PizarraError::History(format!(
            "no table with fecha/venta columns ({} tables on page)",
            tables.len()
        ))
        .into());
    }
    Ok(month_end_closes(&observations))
}

fn run_history(config: &Config, url: Option<&str>, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let closes = load_history(config, url, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&closes)?);
    } else {
        for close in &closes {
            println!("{}  {}  {:>14}", close.month, close.date, format_amount(close.value));
        }
    }
    Ok(())
}

fn load_inflation(
    config: &Config,
    url: Option<&str>,
    file: Option<&Path>,
) -> anyhow::Result<Vec<MonthlyInflation>> {
    let url = if file.is_none() { url.or(Some(INFLATION_URL)) } else { url };
    let page = read_page(config, url, file)?;
    Ok(inflation_from_tables(&html::tables(&page))?)
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{} %", format_amount(v)))
}

fn run_inflation(config: &Config, url: Option<&str>, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let rows = load_inflation(config, url, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let width = rows.iter().map(|r| r.month.chars().count()).max().unwrap_or(3).max(3);
        println!("{:<width$}  {:>10}  {:>10}", "Mes", "Mensual", "Acumulada", width = width);
        for row in &rows {
            println!(
                "{:<width$}  {:>10}  {:>10}",
                row.month,
                format_percent(row.monthly_pct),
                format_percent(row.cumulative_pct),
                width = width
            );
        }
    }
    Ok(())
}

fn run_cache_clear(config: &Config, board: Option<&str>) -> anyhow::Result<()> {
    let cache_service = QuoteCacheService::new()?;
    match board {
        Some(name) => {
            if config.board(name).is_none() {
                bail!("unknown board {:?}", name);
            }
            cache_service.clear(name)?;
        }
        None => {
            for b in &config.boards {
                cache_service.clear(&b.name)?;
            }
        }
    }
    Ok(())
}
