use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Env, Target};

/// Sends `log` output to `path`. Without a path logging stays off, since
/// anything written to the terminal would land on top of the board.
pub fn init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path)
        .with_context(|| format!("Error creating log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("Error initializing logger")?;

    log::info!("logging to {}", path.display());
    Ok(())
}
