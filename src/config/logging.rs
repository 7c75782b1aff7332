use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::app_config::LoggingSection;
use crate::core::errors::Result;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "AUTOBACKUP_LOG";

/// Send `tracing` events to the configured log file (append, no ANSI).
///
/// Filter precedence: `AUTOBACKUP_LOG`, then `debug` when verbose, then
/// `logging.level`.
pub fn init_file_logging(settings: &LoggingSection, verbose: bool) -> Result<()> {
    if let Some(parent) = settings.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)?;

    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::new(&settings.level),
    };

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
