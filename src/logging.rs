//! Tracing subscriber setup.
//!
//! The terminal UI owns the screen while it runs, so interactive sessions log to a file and
//! the one-shot subcommands log to stderr.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "CARTA_LOG";

#[must_use]
/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "carta=debug"
    } else {
        "carta=warn"
    }
}

#[must_use]
/// Log file used by interactive sessions, if a data directory exists.
pub fn default_log_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("carta").join("carta.log"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` or `CARTA_LOG` take precedence over the verbosity flag. Logs go to `log_file`
/// when given, otherwise to stderr.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a subscriber is already installed.
pub fn init_tracing(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::options().create(true).append(true).open(path)?;
        registry
            .with(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::default_directive;

    #[test]
    fn test_verbosity_selects_directive() {
        assert_eq!(default_directive(false), "carta=warn");
        assert_eq!(default_directive(true), "carta=debug");
    }
}
