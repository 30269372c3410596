use anyhow::{Context, Result};
use clap::Parser;
use fourstroke::app::App;
use fourstroke::config::{Args, Config};
use fourstroke::error::EngineError;
use fourstroke::term::{write_ansi, TermGuard};
use std::fs::File;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Size used for snapshots when the terminal size is unknown
const FALLBACK_SIZE: (usize, usize) = (100, 40);

/// Logs go to a file; without `--log-file` nothing is installed
fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    // Checked first so a bad level leaves an existing log untouched
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;
    let file = File::create(path).map_err(|source| EngineError::LogFile {
        path: path.clone(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::try_from(args).context("invalid arguments")?;
    init_logging(&config)?;
    info!(?config, "fourstroke starting");

    let mut app = App::new(&config);

    if config.snapshot {
        let (cols, rows) = termsize::get()
            .map(|size| (size.cols as usize, size.rows as usize))
            .filter(|&(cols, rows)| cols > 0 && rows > 0)
            .unwrap_or(FALLBACK_SIZE);
        let buf = app.snapshot(cols, rows);
        write_ansi(&mut std::io::stdout().lock(), &buf).context("failed to write snapshot")?;
        return Ok(());
    }

    let mut term = TermGuard::new().context("failed to initialize terminal")?;
    app.run(&mut term)?;
    Ok(())
}
