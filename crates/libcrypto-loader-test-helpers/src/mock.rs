//! In-memory stand-ins for the dynamic linker and the host runtime.

use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, c_void};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libcrypto_loader::{DynamicLinker, HostContext, LibraryHandle, ThrowError};
use parking_lot::Mutex;

/// Class the fake host queues when an exception class cannot be found.
pub const CLASS_LOOKUP_FAILURE: &str = "java/lang/NoClassDefFoundError";

#[derive(Debug, Default)]
struct LinkerState {
    images: HashMap<PathBuf, Vec<String>>,
    global: HashSet<String>,
    slot: Option<String>,
    open_failure: Option<String>,
    opened: Vec<PathBuf>,
    lookups: usize,
}

/// A process namespace modelled in memory.
///
/// Images are registered by path with the symbols they export. Opening an
/// image makes its exports globally resolvable for the rest of the fake's
/// life, exactly once per symbol, with no way to unload.
#[derive(Debug, Default)]
pub struct FakeLinker {
    state: Mutex<LinkerState>,
}

impl FakeLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image at `path` exporting `exports`.
    pub fn with_image(self, path: impl Into<PathBuf>, exports: &[&str]) -> Self {
        self.state.lock().images.insert(
            path.into(),
            exports.iter().map(|s| (*s).to_string()).collect(),
        );
        self
    }

    /// Make `symbol` resolvable before any load, as if another component had
    /// already loaded the library.
    pub fn with_resident(self, symbol: &str) -> Self {
        self.state.lock().global.insert(symbol.to_string());
        self
    }

    /// Fail every open with `diagnostic`.
    pub fn failing_open(self, diagnostic: impl Into<String>) -> Self {
        self.state.lock().open_failure = Some(diagnostic.into());
        self
    }

    /// Leave stale text in the error slot.
    pub fn poison_error_slot(&self, stale: &str) {
        self.state.lock().slot = Some(stale.to_string());
    }

    /// Number of open attempts, successful or not.
    pub fn open_calls(&self) -> usize {
        self.state.lock().opened.len()
    }

    /// Paths passed to open, in order.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.state.lock().opened.clone()
    }

    /// Number of symbol lookups.
    pub fn lookups(&self) -> usize {
        self.state.lock().lookups
    }

    /// Whether `symbol` currently resolves.
    pub fn is_resolvable(&self, symbol: &str) -> bool {
        self.state.lock().global.contains(symbol)
    }
}

impl DynamicLinker for FakeLinker {
    fn clear_error(&self) {
        self.state.lock().slot = None;
    }

    fn lookup_global(&self, symbol: &CStr) {
        let mut state = self.state.lock();
        state.lookups += 1;
        let name = symbol.to_string_lossy();
        if !state.global.contains(name.as_ref()) {
            state.slot = Some(format!("undefined symbol: {name}"));
        }
    }

    fn take_error(&self) -> Option<String> {
        self.state.lock().slot.take()
    }

    fn open_global(&self, path: &Path) -> Result<LibraryHandle, String> {
        let mut state = self.state.lock();
        state.opened.push(path.to_path_buf());

        if let Some(diagnostic) = state.open_failure.clone() {
            state.slot = Some(diagnostic.clone());
            return Err(diagnostic);
        }

        let Some(exports) = state.images.get(path).cloned() else {
            let diagnostic = format!(
                "{}: cannot open shared object file: No such file or directory",
                path.display()
            );
            state.slot = Some(diagnostic.clone());
            return Err(diagnostic);
        };

        state.global.extend(exports);
        Ok(LibraryHandle::from_raw(NonNull::<c_void>::dangling()))
    }
}

/// An exception queued on the fake host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedException {
    pub class: String,
    pub message: String,
}

impl RaisedException {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }
}

/// A host call context that records what was raised.
///
/// Like a JVM, at most one exception is pending at a time. `throw_new` does
/// not check for one; guarding against that is the caller's job.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pending: Option<RaisedException>,
    raised: Vec<RaisedException>,
    missing_classes: HashSet<String>,
    reject_code: Option<i32>,
    throw_attempts: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an exception already pending.
    pub fn with_pending(class: &str, message: &str) -> Self {
        Self {
            pending: Some(RaisedException::new(class, message)),
            ..Self::default()
        }
    }

    /// Treat `class` as absent from the class registry.
    pub fn with_missing_class(mut self, class: &str) -> Self {
        self.missing_classes.insert(class.to_string());
        self
    }

    /// Refuse every throw with `code`.
    pub fn rejecting(mut self, code: i32) -> Self {
        self.reject_code = Some(code);
        self
    }

    pub fn pending(&self) -> Option<&RaisedException> {
        self.pending.as_ref()
    }

    /// Exceptions successfully raised through [`HostContext::throw_new`].
    pub fn raised(&self) -> &[RaisedException] {
        &self.raised
    }

    pub fn throw_attempts(&self) -> usize {
        self.throw_attempts
    }

    /// Drop the pending exception, as a host `catch` would.
    pub fn clear(&mut self) -> Option<RaisedException> {
        self.pending.take()
    }
}

impl HostContext for RecordingHost {
    fn exception_pending(&mut self) -> bool {
        self.pending.is_some()
    }

    fn throw_new(&mut self, class: &str, message: &str) -> Result<(), ThrowError> {
        self.throw_attempts += 1;

        if self.missing_classes.contains(class) {
            self.pending = Some(RaisedException::new(CLASS_LOOKUP_FAILURE, class));
            return Err(ThrowError::ClassNotFound {
                class: class.to_string(),
            });
        }

        if let Some(code) = self.reject_code {
            return Err(ThrowError::Rejected {
                class: class.to_string(),
                code,
            });
        }

        let exception = RaisedException::new(class, message);
        self.pending = Some(exception.clone());
        self.raised.push(exception);
        Ok(())
    }

    fn fatal_error(&mut self, message: &str) -> ! {
        panic!("fatal error: {message}")
    }
}
