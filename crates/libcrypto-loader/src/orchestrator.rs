//! The load protocol: probe, acquire, verify, translate.

use std::convert::Infallible;
use std::fmt;

use crate::acquire::{LibraryAcquirer, LibraryPath};
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::linker::DynamicLinker;
use crate::outcome::{LoadLatch, LoadOutcome};
use crate::probe::{CapabilityProbe, ProbeResult, SymbolProbe};
use crate::translate::{HostContext, translate};

/// Sequences one idempotent load of the target library.
///
/// ```text
/// probe canary ── resolved ──────────────────────────────> AlreadyPresent
///      │ unresolved
///      ├── path missing ─────────────────────────────────> FailedNullPath
///      ├── acquire fails ────────────────────────────────> FailedAcquire
///      └── acquire ok ── probe canary ── resolved ───────> Loaded
///                                    └── unresolved ─────> FailedVerify
/// ```
///
/// Every failure is raised on the host before returning.
pub struct LoadOrchestrator<'a, L> {
    linker: L,
    config: &'a LoaderConfig,
    latch: Option<&'a LoadLatch>,
}

impl<'a, L: DynamicLinker + Copy> LoadOrchestrator<'a, L> {
    /// Create an orchestrator over `linker`.
    pub fn new(linker: L, config: &'a LoaderConfig) -> Self {
        Self {
            linker,
            config,
            latch: None,
        }
    }

    /// Record availability in `latch` whenever the library is seen.
    pub fn with_latch(mut self, latch: &'a LoadLatch) -> Self {
        self.latch = Some(latch);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &LoaderConfig {
        self.config
    }

    /// Run the protocol, raising any failure on `host`.
    ///
    /// Calling this again after a `Loaded` outcome always yields
    /// `AlreadyPresent`, because the image's exports are globally visible.
    pub fn load<H: HostContext + ?Sized>(&self, host: &mut H, path: Option<&str>) -> LoadOutcome {
        self.load_with(host, |_| Ok::<_, Infallible>(path.map(str::to_owned)))
    }

    /// Run the protocol, reading the path from the host only once the canary
    /// is known to be unresolved.
    ///
    /// A failed read is an acquisition failure. An exception the host queued
    /// while reading stays the pending one.
    pub fn load_with<H, F, E>(&self, host: &mut H, read_path: F) -> LoadOutcome
    where
        H: HostContext + ?Sized,
        F: FnOnce(&mut H) -> Result<Option<String>, E>,
        E: fmt::Display,
    {
        let outcome = match self.try_load_with(|| read_path(&mut *host)) {
            Ok(outcome) => outcome,
            Err(err) => {
                let class = self.config.exception_class_for(&err);
                let translation = translate(host, class, err.host_message());
                tracing::warn!(
                    error = %err,
                    class,
                    translation = ?translation,
                    "Native library load attempt failed"
                );
                err.outcome()
            }
        };

        if outcome.is_available()
            && let Some(latch) = self.latch
        {
            latch.mark_loaded();
        }
        tracing::debug!(outcome = %outcome, "Native library load finished");
        outcome
    }

    /// Run the protocol without touching the host.
    pub fn try_load(&self, path: Option<&str>) -> Result<LoadOutcome, LoaderError> {
        self.try_load_with(|| Ok::<_, Infallible>(path.map(str::to_owned)))
    }

    /// Run the protocol without touching the host, calling `read_path` only
    /// when a load is needed.
    pub fn try_load_with<F, E>(&self, read_path: F) -> Result<LoadOutcome, LoaderError>
    where
        F: FnOnce() -> Result<Option<String>, E>,
        E: fmt::Display,
    {
        let probe = SymbolProbe::new(self.linker);
        let canary = &self.config.canary_symbol;

        if let ProbeResult::Resolved = probe.probe_capability(canary) {
            tracing::debug!(symbol = %canary, "Canary already resolvable; skipping load");
            return Ok(LoadOutcome::AlreadyPresent);
        }

        let path = read_path().map_err(|err| LoaderError::PathUnreadable {
            diagnostic: err.to_string(),
        })?;
        let path = LibraryPath::new(path.as_deref())?;
        LibraryAcquirer::new(self.linker).acquire(path)?;

        // Telemetry only: whether the unmangled name is also visible. What this
        // says about the image is unconfirmed, so it never gates the result.
        if let Some(diagnostic_symbol) = &self.config.diagnostic_symbol {
            let result = probe.probe_capability(diagnostic_symbol);
            tracing::debug!(
                symbol = %diagnostic_symbol,
                diagnostic = result.diagnostic().unwrap_or("none"),
                "Diagnostic symbol probe"
            );
        }

        match probe.probe_capability(canary) {
            ProbeResult::Resolved => {
                tracing::info!(
                    path = %path.as_path().display(),
                    symbol = %canary,
                    "Native library loaded and verified"
                );
                Ok(LoadOutcome::Loaded)
            }
            ProbeResult::Unresolved { diagnostic } => Err(LoaderError::VerifyFailed {
                symbol: canary.to_string(),
                diagnostic,
            }),
        }
    }
}
