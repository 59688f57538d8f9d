//! Configuration for applications built on the debouncers.
//!
//! Settings are deserialized with `serde` from an optional TOML file, then
//! overridden by `RDX_DEBOUNCE_*` environment variables
//! (e.g. `RDX_DEBOUNCE_CALL_DELAY_MS=150`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "RDX_DEBOUNCE";

/// Default delays and log level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period for call debouncers, in milliseconds.
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,

    /// Quiet period for value debouncers, in milliseconds.
    /// `None` commits on the next scheduler turn.
    #[serde(default)]
    pub value_delay_ms: Option<u64>,

    /// A `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl DebounceConfig {
    /// Loads the configuration from `path` (if given) and the environment.
    ///
    /// A missing `path` is an error; omitting it yields defaults plus env overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    pub fn value_delay(&self) -> Option<Duration> {
        self.value_delay_ms.map(Duration::from_millis)
    }
}

// --- Default value functions for serde ---

fn default_call_delay_ms() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            call_delay_ms: default_call_delay_ms(),
            value_delay_ms: None,
            log_level: default_log_level(),
        }
    }
}
