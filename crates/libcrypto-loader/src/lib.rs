//! Idempotent loading of a native libcrypto into the global symbol namespace.
//!
//! A managed host (the JVM) may already have a compatible libcrypto resident,
//! loaded by another component or by an earlier call. This crate decides
//! whether a load is needed, performs it, and proves it worked:
//!
//! - [`probe`] - is the mangled canary symbol resolvable process-wide?
//! - [`acquire`] - `dlopen` the image with `RTLD_NOW | RTLD_GLOBAL`
//! - [`translate`] - raise failures on the host without masking a pending one
//! - [`orchestrator`] - the probe, acquire, verify sequence
//!
//! # Load outcomes
//!
//! | Outcome | Host result | Exception |
//! |---------|-------------|-----------|
//! | `AlreadyPresent` | `false` | none |
//! | `Loaded` | `true` | none |
//! | `FailedNullPath` | `false` | null argument |
//! | `FailedAcquire` | `false` | load failure, linker diagnostic |
//! | `FailedVerify` | `false` | load failure, linker diagnostic |
//!
//! # Safety Considerations
//!
//! Loading runs the image's initializers with full process privileges, and
//! its exports become visible to every other image in the process. There is
//! no unload.
//!
//! # Example
//!
//! ```rust,no_run
//! use libcrypto_loader::{LoadOrchestrator, LoaderConfig, SystemLinker};
//!
//! let config = LoaderConfig::default();
//! let outcome = LoadOrchestrator::new(SystemLinker::new(), &config)
//!     .try_load(Some("/opt/accp/lib/libcrypto.so"))?;
//! println!("{outcome}");
//! # Ok::<(), libcrypto_loader::LoaderError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod acquire;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod linker;
pub mod orchestrator;
pub mod outcome;
pub mod prelude;
pub mod probe;
pub mod translate;

#[cfg(unix)]
#[cfg_attr(docsrs, doc(cfg(unix)))]
pub mod system;

pub use acquire::{LibraryAcquirer, LibraryPath};
pub use config::{
    CANARY_SYMBOL, CanarySymbol, LOAD_FAILURE_CLASS, LoaderConfig, NULL_ARGUMENT_CLASS,
};
pub use diagnostics::{DiagnosticsConfig, init_diagnostics, init_diagnostics_from_env};
pub use error::{ConfigError, FailureKind, LoaderError, ThrowError};
pub use linker::{DynamicLinker, LibraryHandle};
pub use orchestrator::LoadOrchestrator;
pub use outcome::{LoadLatch, LoadOutcome, LoadState};
pub use probe::{CapabilityProbe, ProbeResult, SymbolProbe};
pub use translate::{HostContext, Translation, translate};

#[cfg(unix)]
pub use system::SystemLinker;
