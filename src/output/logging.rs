//! Tracing subscriber setup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::error::{Error, Result};

/// Handle to the installed log filter.
///
/// The level from `RUST_LOG` or `--debug` is fixed; otherwise a pipeline
/// config's `log_level` replaces the default `info` once it is loaded.
pub struct LogControl {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
    pinned: bool,
}

impl LogControl {
    /// A control that ignores level changes, for library use without a subscriber.
    pub fn disabled() -> Self {
        Self {
            handle: None,
            pinned: true,
        }
    }

    /// Switch to the level named in a config file.
    pub fn apply_config_level(&self, level: &str) -> Result<()> {
        let Some(handle) = &self.handle else {
            return Ok(());
        };
        if self.pinned {
            return Ok(());
        }

        let filter = EnvFilter::try_new(level.trim().to_ascii_lowercase()).map_err(|e| {
            Error::ConfigValidation {
                field: "log_level".to_string(),
                message: e.to_string(),
            }
        })?;
        handle
            .reload(filter)
            .map_err(|e| Error::Config(format!("Failed to apply log level: {}", e)))?;
        tracing::debug!("Log level set to {}", level);
        Ok(())
    }
}

/// Install the global subscriber.
pub fn init_logging(debug: bool) -> LogControl {
    let (filter, pinned) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) if debug => (EnvFilter::new("debug"), true),
        Err(_) => (EnvFilter::new("info"), false),
    };

    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .is_ok();

    LogControl {
        handle: installed.then_some(handle),
        pinned,
    }
}
