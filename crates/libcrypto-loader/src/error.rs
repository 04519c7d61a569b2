//! Error types for native library acquisition.

use std::path::PathBuf;
use thiserror::Error;

use crate::outcome::LoadOutcome;

/// Message raised with the null-argument exception when no path was supplied.
pub const NULL_PATH_MESSAGE: &str = "Library file was null";

/// Message raised with the null-argument exception when the path was empty.
pub const EMPTY_PATH_MESSAGE: &str = "Library file was empty";

/// Failure of a single load attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// The canary was unresolved and no library path was supplied.
    #[error("Library path is null")]
    NullPath,

    /// The canary was unresolved and the supplied library path was empty.
    #[error("Library path is empty")]
    EmptyPath,

    /// The host could not hand over the library path.
    #[error("Library path could not be read: {diagnostic}")]
    PathUnreadable {
        /// Host diagnostic.
        diagnostic: String,
    },

    /// The dynamic linker refused to load the image.
    #[error("Failed to load {path}: {diagnostic}")]
    AcquireFailed {
        /// Path handed to the linker.
        path: PathBuf,
        /// Linker diagnostic, verbatim.
        diagnostic: String,
    },

    /// The image loaded but the canary still does not resolve.
    #[error("Loaded library does not export {symbol}: {diagnostic}")]
    VerifyFailed {
        /// Canary symbol that failed to resolve.
        symbol: String,
        /// Linker diagnostic from the verification probe, verbatim.
        diagnostic: String,
    },
}

/// Coarse classification of a [`LoaderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Caller supplied no usable path.
    Usage,
    /// The load primitive itself failed.
    Acquisition,
    /// The load primitive succeeded but produced an unusable library.
    Verification,
}

impl LoaderError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            LoaderError::NullPath | LoaderError::EmptyPath => FailureKind::Usage,
            LoaderError::PathUnreadable { .. } | LoaderError::AcquireFailed { .. } => {
                FailureKind::Acquisition
            }
            LoaderError::VerifyFailed { .. } => FailureKind::Verification,
        }
    }

    /// The terminal outcome a load attempt reports for this error.
    pub fn outcome(&self) -> LoadOutcome {
        match self.kind() {
            FailureKind::Usage => LoadOutcome::FailedNullPath,
            FailureKind::Acquisition => LoadOutcome::FailedAcquire,
            FailureKind::Verification => LoadOutcome::FailedVerify,
        }
    }

    /// Message carried by the host exception.
    ///
    /// Native failures pass the linker text through untouched so callers see
    /// exactly what `dlerror` reported.
    pub fn host_message(&self) -> &str {
        match self {
            LoaderError::NullPath => NULL_PATH_MESSAGE,
            LoaderError::EmptyPath => EMPTY_PATH_MESSAGE,
            LoaderError::PathUnreadable { diagnostic }
            | LoaderError::AcquireFailed { diagnostic, .. }
            | LoaderError::VerifyFailed { diagnostic, .. } => diagnostic,
        }
    }
}

/// Invalid loader configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Symbol names must be non-empty.
    #[error("Symbol name is empty")]
    EmptySymbol,

    /// Symbol names are passed to the linker as C strings.
    #[error("Symbol name {name:?} contains an interior NUL byte")]
    InteriorNul {
        /// Offending name.
        name: String,
    },

    /// Exception class names must be non-empty.
    #[error("Exception class name for {role} is empty")]
    EmptyExceptionClass {
        /// Which exception slot was empty.
        role: &'static str,
    },
}

/// Failure to raise an exception on the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrowError {
    /// The exception class could not be resolved. The host has already queued
    /// its own class-lookup failure.
    #[error("Exception class not found: {class}")]
    ClassNotFound {
        /// Class that failed to resolve.
        class: String,
    },

    /// The host refused the raise.
    #[error("Host rejected throw of {class} (code {code})")]
    Rejected {
        /// Class being raised.
        class: String,
        /// Status code returned by the host.
        code: i32,
    },
}
