//! Canary symbol probing.

use crate::config::CanarySymbol;
use crate::linker::{DynamicLinker, lock_error_slot};

/// Answer to "is this capability present in the process?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The symbol resolves in the global namespace.
    Resolved,
    /// The symbol does not resolve; carries the linker's explanation.
    Unresolved {
        /// Linker diagnostic, verbatim.
        diagnostic: String,
    },
}

impl ProbeResult {
    /// Whether the symbol resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, ProbeResult::Resolved)
    }

    /// The diagnostic, if the symbol did not resolve.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ProbeResult::Resolved => None,
            ProbeResult::Unresolved { diagnostic } => Some(diagnostic),
        }
    }
}

/// Checks whether a named capability is present in the process.
///
/// Symbol resolvability is the only implementation today; the trait keeps
/// callers independent of how presence is established.
pub trait CapabilityProbe {
    /// Probe for `name`.
    fn probe_capability(&self, name: &CanarySymbol) -> ProbeResult;

    /// Shorthand for `probe_capability(name).is_resolved()`.
    fn has_capability(&self, name: &CanarySymbol) -> bool {
        self.probe_capability(name).is_resolved()
    }
}

/// Looks canary symbols up in the process-wide global namespace.
#[derive(Debug, Clone, Copy)]
pub struct SymbolProbe<L> {
    linker: L,
}

impl<L: DynamicLinker> SymbolProbe<L> {
    /// Probe through `linker`.
    pub fn new(linker: L) -> Self {
        Self { linker }
    }

    /// Clear the error slot, look the symbol up, then read the slot back.
    ///
    /// The slot retains stale text from earlier calls, so the clear must come
    /// first. A lookup that succeeds leaves the slot empty.
    pub fn probe(&self, symbol: &CanarySymbol) -> ProbeResult {
        let _slot = lock_error_slot();
        self.linker.clear_error();
        self.linker.lookup_global(symbol.as_c_str());
        match self.linker.take_error() {
            None => ProbeResult::Resolved,
            Some(diagnostic) => ProbeResult::Unresolved { diagnostic },
        }
    }
}

impl<L: DynamicLinker> CapabilityProbe for SymbolProbe<L> {
    fn probe_capability(&self, name: &CanarySymbol) -> ProbeResult {
        let result = self.probe(name);
        tracing::trace!(
            symbol = %name,
            resolved = result.is_resolved(),
            diagnostic = result.diagnostic().unwrap_or(""),
            "Probed canary symbol"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::ffi::CStr;
    use std::path::Path;

    use crate::linker::LibraryHandle;

    /// Linker whose error slot starts dirty, to catch missing clears.
    struct StaleSlotLinker {
        slot: RefCell<Option<String>>,
        resolves: bool,
        lookups: Cell<usize>,
    }

    impl DynamicLinker for StaleSlotLinker {
        fn clear_error(&self) {
            self.slot.borrow_mut().take();
        }

        fn lookup_global(&self, symbol: &CStr) {
            self.lookups.set(self.lookups.get() + 1);
            if !self.resolves {
                *self.slot.borrow_mut() =
                    Some(format!("undefined symbol: {}", symbol.to_string_lossy()));
            }
        }

        fn take_error(&self) -> Option<String> {
            self.slot.borrow_mut().take()
        }

        fn open_global(&self, _path: &Path) -> Result<LibraryHandle, String> {
            Err("not supported".to_string())
        }
    }

    fn stale(resolves: bool) -> StaleSlotLinker {
        StaleSlotLinker {
            slot: RefCell::new(Some("stale error from an earlier call".to_string())),
            resolves,
            lookups: Cell::new(0),
        }
    }

    #[test]
    fn test_stale_error_does_not_leak_into_probe() {
        let linker = stale(true);
        let probe = SymbolProbe::new(&linker);
        let result = probe.probe(&CanarySymbol::libcrypto());
        assert_eq!(result, ProbeResult::Resolved);
        assert_eq!(linker.lookups.get(), 1);
    }

    #[test]
    fn test_unresolved_carries_fresh_diagnostic() {
        let linker = stale(false);
        let probe = SymbolProbe::new(&linker);
        let result = probe.probe(&CanarySymbol::unmangled());
        assert_eq!(
            result.diagnostic(),
            Some("undefined symbol: CRYPTO_library_init")
        );
    }

    #[test]
    fn test_capability_shorthand() {
        let linker = stale(true);
        assert!(SymbolProbe::new(&linker).has_capability(&CanarySymbol::libcrypto()));
    }
}
