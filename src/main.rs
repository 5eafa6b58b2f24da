use anyhow::Context;
use clap::Parser;
use evs::cli::Cli;
use evs::headless::{self, HeadlessPrinter};
use evs_core::{SearchController, SearchEngine, SearchState};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = cli.load_config()?;
    let engine = SearchEngine::new(
        evs_decoder::decoder_for(config.search.decoder),
        config.search.file_pattern()?,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    let mut controller = SearchController::new(Arc::new(engine), runtime.handle().clone());

    if !cli.headless {
        evs_tui::run(&config, controller)?;
        return Ok(ExitCode::SUCCESS);
    }

    let request = config.search.request(cli.criterion(&config))?;
    // Unlocked handles: worker threads may log to stderr while we print
    let mut printer = HeadlessPrinter::new(io::BufWriter::new(io::stdout()), io::stderr(), cli.format);
    let state = runtime.block_on(headless::run(&mut controller, request, &mut printer))?;
    tracing::debug!(%state, printed = printer.printed(), "headless: done");

    Ok(match state {
        SearchState::Failed => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    })
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    if cli.debug {
        let path = std::env::temp_dir().join("evs-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(env_filter("debug"))
            .init();
        tracing::info!("evs debug log started — tail -f {}", path.display());
    } else if cli.headless {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter("warn"))
            .init();
    }
    Ok(())
}
