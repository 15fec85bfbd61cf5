//! Logger setup for the `trellis` binary and embedding hosts.
//!
//! The library only ever talks to the `log` facade; installing a logger is the
//! host's call. [`init_logging`] is the one the CLI uses.

use std::sync::Once;

use crate::config::LogSettings;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "warn",
/// "trellis=debug"). `RUST_LOG`, when set, takes precedence.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl From<&LogSettings> for LoggingConfig {
    fn from(settings: &LogSettings) -> Self {
        Self {
            env_filter: settings.filter.clone(),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = build_logger(&config, std::env::var("RUST_LOG").ok().as_deref());

        // Another logger may already be installed by an embedding host.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

/// Filter precedence: `rust_log`, then `config.env_filter`, then warn.
fn build_logger(config: &LoggingConfig, rust_log: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    if let Some(filter) = rust_log {
        builder.parse_filters(filter);
    } else if let Some(filter) = &config.env_filter {
        builder.parse_filters(filter);
    } else {
        // Keep CLI output clean; security denials still show.
        builder.filter_level(log::LevelFilter::Warn);
    }

    builder.write_style(config.write_style);
    builder
}
