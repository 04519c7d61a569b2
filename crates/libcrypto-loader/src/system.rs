//! The platform dynamic linker (`dlfcn`).
#![expect(unsafe_code, reason = "thin wrapper over the dlfcn C API")]

use std::ffi::{CStr, c_void};
use std::path::Path;
use std::ptr::NonNull;

use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};

use crate::linker::{DynamicLinker, LibraryHandle};

/// [`DynamicLinker`] backed by the process's real dynamic linker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinker;

impl SystemLinker {
    /// A handle to the system linker.
    pub const fn new() -> Self {
        Self
    }
}

impl DynamicLinker for SystemLinker {
    fn clear_error(&self) {
        // SAFETY: dlerror takes no arguments; the returned string is discarded.
        unsafe { libc::dlerror() };
    }

    fn lookup_global(&self, symbol: &CStr) {
        // SAFETY: RTLD_DEFAULT is a valid pseudo-handle and `symbol` is a
        // NUL-terminated string that outlives the call.
        let _addr: *mut c_void = unsafe { libc::dlsym(libc::RTLD_DEFAULT, symbol.as_ptr()) };
    }

    fn take_error(&self) -> Option<String> {
        // SAFETY: dlerror takes no arguments.
        let err_ptr = unsafe { libc::dlerror() };
        if err_ptr.is_null() {
            return None;
        }
        // SAFETY: a non-null dlerror result is a NUL-terminated string valid
        // until the next dlfcn call on this thread; it is copied out here.
        let message = unsafe { CStr::from_ptr(err_ptr) };
        Some(message.to_string_lossy().into_owned())
    }

    fn open_global(&self, path: &Path) -> Result<LibraryHandle, String> {
        // SAFETY: loading runs the image's initializers. The caller asked for
        // exactly this image to become part of the process.
        let library = unsafe { Library::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }
            .map_err(native_diagnostic)?;
        // The image stays resident for the life of the process.
        let raw = library.into_raw();
        NonNull::new(raw)
            .map(LibraryHandle::from_raw)
            .ok_or_else(|| "dlopen returned a null handle without an error".to_string())
    }
}

/// The linker's own text for a failed open.
///
/// `libloading` renders `DlOpen` as a fixed summary and keeps the `dlerror`
/// string as its source.
fn native_diagnostic(err: libloading::Error) -> String {
    match err {
        libloading::Error::DlOpen { source } => source.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_libc_symbol() {
        let linker = SystemLinker::new();
        linker.clear_error();
        linker.lookup_global(c"malloc");
        assert_eq!(linker.take_error(), None);
    }

    #[test]
    fn test_unresolved_symbol_sets_error() {
        let linker = SystemLinker::new();
        linker.clear_error();
        linker.lookup_global(c"libcrypto_loader_no_such_symbol_4f1c");
        let err = linker.take_error();
        assert!(err.is_some_and(|e| !e.is_empty()));
        // Reading clears the slot.
        assert_eq!(linker.take_error(), None);
    }

    #[test]
    fn test_open_missing_file_reports_diagnostic() {
        let linker = SystemLinker::new();
        let result = linker.open_global(Path::new("/nonexistent/libcrypto-loader-test.so"));
        let msg = result.err().unwrap_or_default();
        assert!(msg.contains("/nonexistent/libcrypto-loader-test.so"), "{msg}");
        assert!(msg.contains("No such file or directory"), "{msg}");
        assert_ne!(msg, "dlopen failed");
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_open_garbage_file_reports_elf_error() -> Result<(), std::io::Error> {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".so").tempfile()?;
        file.write_all(b"definitely not a shared object")?;
        file.flush()?;

        let msg = SystemLinker::new()
            .open_global(file.path())
            .err()
            .unwrap_or_default();
        assert!(
            msg.contains("invalid ELF header") || msg.contains("file too short"),
            "{msg}"
        );
        Ok(())
    }
}
