//! Tracing setup for one Matchlight run.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the
//! configured level. With a log file configured, output goes there as
//! plain text (no ANSI); an unopenable file falls back to the console so
//! a bad path never silences a run.

use std::fs::OpenOptions;
use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber from the given configuration.
pub fn init_logging(config: &LoggingConfig) {
    if let Some(path) = &config.file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                install(config, Mutex::new(file), false);
                return;
            }
            Err(e) => {
                eprintln!(
                    "matchlight: cannot open log file {}: {e}; logging to console",
                    path.display()
                );
            }
        }
    }
    install(config, std::io::stdout, true);
}

fn install<W>(config: &LoggingConfig, writer: W, ansi: bool)
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
