//! Loader configuration.

use std::ffi::{CStr, CString};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoaderError};

/// Canary symbol baked in at build time, including any `AWSLC_MANGLE` prefix.
pub const CANARY_SYMBOL: &str = env!("LIBCRYPTO_CANARY_SYMBOL");

/// The canary without its mangling prefix. Only probed for diagnostics.
pub const UNMANGLED_CANARY_SYMBOL: &str = env!("LIBCRYPTO_UNMANGLED_SYMBOL");

/// Exception raised when a load is needed but no path was given.
pub const NULL_ARGUMENT_CLASS: &str = "java/lang/NullPointerException";

/// Exception raised when the library cannot be loaded or verified.
pub const LOAD_FAILURE_CLASS: &str = "com/amazon/corretto/crypto/provider/RuntimeCryptoException";

/// A symbol name that can be handed to the dynamic linker.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanarySymbol {
    name: CString,
}

impl CanarySymbol {
    /// Validate a symbol name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        let name = CString::new(name).map_err(|e| ConfigError::InteriorNul {
            name: String::from_utf8_lossy(&e.into_vec()).into_owned(),
        })?;
        Ok(Self { name })
    }

    /// The build-time canary for the target libcrypto.
    pub fn libcrypto() -> Self {
        Self::from_const(CANARY_SYMBOL)
    }

    /// The canary name without the mangling prefix.
    pub fn unmangled() -> Self {
        Self::from_const(UNMANGLED_CANARY_SYMBOL)
    }

    fn from_const(name: &'static str) -> Self {
        // Build-time names never contain NUL; fall back to lossy stripping so
        // construction stays infallible.
        let name = CString::new(name)
            .unwrap_or_else(|_| CString::new(name.replace('\0', "")).unwrap_or_default());
        Self { name }
    }

    /// The name as a C string.
    pub fn as_c_str(&self) -> &CStr {
        &self.name
    }

    /// The name as UTF-8, lossily.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

impl fmt::Debug for CanarySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanarySymbol").field(&self.as_str()).finish()
    }
}

impl fmt::Display for CanarySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl TryFrom<String> for CanarySymbol {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CanarySymbol> for String {
    fn from(value: CanarySymbol) -> Self {
        value.name.to_string_lossy().into_owned()
    }
}

/// Configuration for a load attempt.
///
/// Exception classes use the host's internal (slash-separated) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Symbol whose resolvability means "the library is loaded".
    pub canary_symbol: CanarySymbol,
    /// Extra symbol probed after a load for diagnostics only.
    pub diagnostic_symbol: Option<CanarySymbol>,
    /// Exception raised for a missing path.
    pub null_argument_class: String,
    /// Exception raised for acquisition and verification failures.
    pub load_failure_class: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            canary_symbol: CanarySymbol::libcrypto(),
            diagnostic_symbol: Some(CanarySymbol::unmangled()),
            null_argument_class: NULL_ARGUMENT_CLASS.to_string(),
            load_failure_class: LOAD_FAILURE_CLASS.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration probing a different canary.
    pub fn with_canary(canary_symbol: CanarySymbol) -> Self {
        Self {
            canary_symbol,
            ..Self::default()
        }
    }

    /// Drop the diagnostic-only probe.
    pub fn without_diagnostic_probe(mut self) -> Self {
        self.diagnostic_symbol = None;
        self
    }

    /// Check the exception class names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.null_argument_class.is_empty() {
            return Err(ConfigError::EmptyExceptionClass {
                role: "null argument",
            });
        }
        if self.load_failure_class.is_empty() {
            return Err(ConfigError::EmptyExceptionClass {
                role: "load failure",
            });
        }
        Ok(())
    }

    /// Exception class to raise for a given failure.
    pub fn exception_class_for(&self, err: &LoaderError) -> &str {
        match err {
            LoaderError::NullPath | LoaderError::EmptyPath => &self.null_argument_class,
            LoaderError::PathUnreadable { .. }
            | LoaderError::AcquireFailed { .. }
            | LoaderError::VerifyFailed { .. } => {
                &self.load_failure_class
            }
        }
    }
}
