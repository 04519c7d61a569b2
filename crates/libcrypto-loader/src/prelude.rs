//! Convenience re-exports for common types.

pub use crate::acquire::{LibraryAcquirer, LibraryPath};
pub use crate::config::{CanarySymbol, LoaderConfig};
pub use crate::error::{ConfigError, FailureKind, LoaderError, ThrowError};
pub use crate::linker::{DynamicLinker, LibraryHandle};
pub use crate::orchestrator::LoadOrchestrator;
pub use crate::outcome::{LoadLatch, LoadOutcome};
pub use crate::probe::{CapabilityProbe, ProbeResult, SymbolProbe};
pub use crate::translate::{HostContext, Translation, translate};

#[cfg(unix)]
pub use crate::system::SystemLinker;
