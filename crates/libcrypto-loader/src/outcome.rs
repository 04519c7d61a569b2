//! Load outcomes and the process-wide load latch.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Terminal result of one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// The canary already resolved; nothing was loaded.
    AlreadyPresent,
    /// This call loaded the library and the canary now resolves.
    Loaded,
    /// No path was supplied while a load was needed.
    FailedNullPath,
    /// The linker refused the image.
    FailedAcquire,
    /// The image loaded but the canary did not resolve afterwards.
    FailedVerify,
}

impl LoadOutcome {
    /// Whether this call performed the load. This is the value reported back
    /// to the host as its boolean result.
    pub fn performed_load(self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }

    /// Whether the library is usable after this call.
    pub fn is_available(self) -> bool {
        matches!(self, LoadOutcome::AlreadyPresent | LoadOutcome::Loaded)
    }

    /// Whether an exception was (or would have been) raised.
    pub fn is_failure(self) -> bool {
        !self.is_available()
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadOutcome::AlreadyPresent => "already-present",
            LoadOutcome::Loaded => "loaded",
            LoadOutcome::FailedNullPath => "failed-null-path",
            LoadOutcome::FailedAcquire => "failed-acquire",
            LoadOutcome::FailedVerify => "failed-verify",
        };
        f.write_str(name)
    }
}

/// Observed state of the target library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No call has yet seen the canary resolve.
    NotLoaded,
    /// The canary has resolved at least once. There is no way back.
    Loaded,
}

/// One-shot `NotLoaded -> Loaded` latch.
///
/// Purely observational: the canary probe stays the source of truth, since
/// another component may load the library without going through this latch.
#[derive(Debug, Default)]
pub struct LoadLatch {
    loaded: AtomicBool,
}

impl LoadLatch {
    /// A latch in the `NotLoaded` state.
    pub const fn new() -> Self {
        Self {
            loaded: AtomicBool::new(false),
        }
    }

    /// Record that the library is available. Returns `true` if this call made
    /// the transition.
    pub fn mark_loaded(&self) -> bool {
        !self.loaded.swap(true, Ordering::AcqRel)
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        if self.loaded.load(Ordering::Acquire) {
            LoadState::Loaded
        } else {
            LoadState::NotLoaded
        }
    }

    /// Shorthand for `state() == LoadState::Loaded`.
    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }
}
