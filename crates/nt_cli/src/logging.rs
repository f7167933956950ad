use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::Level;

static INIT: Once = Once::new();

/// Where log lines go.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// Nothing is logged; used by the full-screen UI without a log file.
    Off,
}

/// Installs the global subscriber once. Later calls are no-ops.
pub fn init_logging(verbose: bool, target: LogTarget<'_>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let mut result = Ok(());

    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            result = install(level, target);
        });
    }
    result
}

fn install(level: Level, target: LogTarget<'_>) -> anyhow::Result<()> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Off => {}
    }
    Ok(())
}
