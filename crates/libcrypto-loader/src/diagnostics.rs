//! Diagnostic output to stderr.
//!
//! The loader normally runs inside a host process that owns stdout, and no
//! subscriber is installed on its behalf. [`init_diagnostics`] installs a
//! stderr `fmt` layer filtered by `LIBCRYPTO_LOADER_LOG`, at most once per
//! process.

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "LIBCRYPTO_LOADER_LOG";

/// Settings for the diagnostic subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Level used when no filter directive is supplied.
    pub default_level: Level,
    /// Include thread ids in each line.
    pub with_thread_ids: bool,
    /// Emit ANSI colour codes.
    pub ansi: bool,
    /// Explicit filter directive, taking precedence over `default_level`.
    pub filter: Option<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            with_thread_ids: true,
            ansi: false,
            filter: None,
        }
    }
}

impl DiagnosticsConfig {
    /// Defaults, with the filter taken from [`LOG_ENV_VAR`] if set.
    pub fn from_env() -> Self {
        Self {
            filter: std::env::var(LOG_ENV_VAR)
                .ok()
                .filter(|directive| !directive.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Build the filter for this configuration. An unparsable directive falls
    /// back to `default_level`.
    pub fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(self.default_level.as_str().to_ascii_lowercase()))
    }
}

static INIT: OnceLock<bool> = OnceLock::new();

/// Install the stderr subscriber. Returns `true` if this crate's subscriber
/// is the active global one.
///
/// Safe to call repeatedly; only the first call does any work. If the host
/// process already installed a global subscriber, that one is left alone.
pub fn init_diagnostics(config: &DiagnosticsConfig) -> bool {
    *INIT.get_or_init(|| install(config))
}

/// [`init_diagnostics`] with [`DiagnosticsConfig::from_env`]. The environment
/// is read on the first call only.
pub fn init_diagnostics_from_env() -> bool {
    *INIT.get_or_init(|| install(&DiagnosticsConfig::from_env()))
}

fn install(config: &DiagnosticsConfig) -> bool {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(config.with_thread_ids)
        .with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
