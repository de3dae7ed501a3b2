//! File logging. The terminal belongs to the UI, so log output goes to a file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Default log location: `<data dir>/chatbot/chatbot.log`
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("chatbot").join("chatbot.log"))
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "chatbot=info,chatbot_core=info",
        1 => "chatbot=debug,chatbot_core=debug",
        _ => "trace",
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init(path: &Path, verbose: u8) -> Result<()> {
    let file = open_log_file(path)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}
