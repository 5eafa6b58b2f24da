//! Command-line flags. Every flag is optional and overrides the matching
//! `config.toml` value.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use evs_core::config::{Config, DecoderKind};
use evs_core::SearchCriterion;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "evs",
    version,
    about = "Event Viewer Search — search Windows event logs by event ID"
)]
pub struct Cli {
    /// Directory holding the log files (non-recursive).
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Stop after this many matching events.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Glob matched against file names, e.g. "Security*.evtx".
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Log format: "evtx" or "jsonl".
    #[arg(long, value_parser = parse_decoder)]
    pub decoder: Option<DecoderKind>,

    /// Event ID to search for (pre-fills the search form in the TUI).
    #[arg(short, long, allow_negative_numbers = true)]
    pub event_id: Option<i64>,

    /// Run one search, print the matches to stdout and exit.
    #[arg(long)]
    pub headless: bool,

    /// Headless output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Read this config file instead of ~/.config/evs/config.toml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write debug logs to <temp dir>/evs-debug.log (tail -f to inspect).
    #[arg(long)]
    pub debug: bool,
}

/// How headless mode prints matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One record JSON object per line.
    Jsonl,
    /// `ordinal<TAB>timestamp<TAB>file` per match.
    Index,
}

fn parse_decoder(s: &str) -> Result<DecoderKind, String> {
    s.parse::<DecoderKind>().map_err(|err| err.to_string())
}

impl Cli {
    /// Load the config file, apply flag overrides, then validate the result.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::load().context("loading config")?,
        };
        self.apply(&mut config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut Config) {
        let search = &mut config.search;
        if let Some(path) = &self.path {
            search.directory = path.clone();
        }
        if let Some(limit) = self.limit {
            search.limit = limit;
        }
        if let Some(pattern) = &self.pattern {
            search.pattern = pattern.clone();
        }
        if let Some(decoder) = self.decoder {
            search.decoder = decoder;
        }
        if let Some(event_id) = self.event_id {
            search.event_id = event_id;
        }
    }

    /// The criterion a headless run searches for.
    pub fn criterion(&self, config: &Config) -> SearchCriterion {
        SearchCriterion::new(self.event_id.unwrap_or(config.search.event_id))
    }
}
