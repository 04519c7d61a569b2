//! Dynamic linker seam.

use std::ffi::{CStr, c_void};
use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

use parking_lot::{Mutex, MutexGuard, const_mutex};

/// Guards the linker's process-wide error slot. Every clear/operate/read
/// sequence against the slot happens while holding this lock.
static ERROR_SLOT: Mutex<()> = const_mutex(());

pub(crate) fn lock_error_slot() -> MutexGuard<'static, ()> {
    ERROR_SLOT.lock()
}

/// The operations this crate needs from the platform dynamic linker.
///
/// The error slot methods mirror `dlerror`: reading the slot also clears it,
/// and the slot keeps the last failure until it is read.
pub trait DynamicLinker {
    /// Discard whatever is in the error slot.
    fn clear_error(&self);

    /// Look `symbol` up in the process-wide global namespace. The address is
    /// not needed; a failure is recorded in the error slot.
    fn lookup_global(&self, symbol: &CStr);

    /// Read and clear the error slot.
    fn take_error(&self) -> Option<String>;

    /// Load the image at `path` with immediate binding and global visibility.
    /// On failure returns the linker's diagnostic.
    fn open_global(&self, path: &Path) -> Result<LibraryHandle, String>;
}

impl<L: DynamicLinker + ?Sized> DynamicLinker for &L {
    fn clear_error(&self) {
        (**self).clear_error();
    }

    fn lookup_global(&self, symbol: &CStr) {
        (**self).lookup_global(symbol);
    }

    fn take_error(&self) -> Option<String> {
        (**self).take_error()
    }

    fn open_global(&self, path: &Path) -> Result<LibraryHandle, String> {
        (**self).open_global(path)
    }
}

/// Opaque handle to a loaded image.
///
/// Never closed: the library stays resident for the life of the process.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LibraryHandle {
    raw: NonNull<c_void>,
}

impl LibraryHandle {
    /// Wrap a raw handle returned by the linker.
    pub fn from_raw(raw: NonNull<c_void>) -> Self {
        Self { raw }
    }

    /// The raw handle.
    pub fn as_ptr(&self) -> *mut c_void {
        self.raw.as_ptr()
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibraryHandle({:p})", self.raw)
    }
}
