//! Loading the library image into the global namespace.

use std::path::Path;

use crate::error::LoaderError;
use crate::linker::{DynamicLinker, LibraryHandle, lock_error_slot};

/// A library path known to be present and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryPath<'a> {
    path: &'a Path,
}

impl<'a> LibraryPath<'a> {
    /// Validate a path handed over by the host.
    pub fn new(path: Option<&'a str>) -> Result<Self, LoaderError> {
        match path {
            None => Err(LoaderError::NullPath),
            Some("") => Err(LoaderError::EmptyPath),
            Some(path) => Ok(Self {
                path: Path::new(path),
            }),
        }
    }

    /// The underlying path.
    pub fn as_path(&self) -> &'a Path {
        self.path
    }
}

/// Requests the linker load an image with `RTLD_NOW | RTLD_GLOBAL` semantics.
#[derive(Debug, Clone, Copy)]
pub struct LibraryAcquirer<L> {
    linker: L,
}

impl<L: DynamicLinker> LibraryAcquirer<L> {
    /// Acquire through `linker`.
    pub fn new(linker: L) -> Self {
        Self { linker }
    }

    /// Load the image. Irreversible: there is no matching unload.
    pub fn acquire(&self, path: LibraryPath<'_>) -> Result<LibraryHandle, LoaderError> {
        tracing::info!(path = %path.as_path().display(), "About to load native library");

        let result = {
            let _slot = lock_error_slot();
            self.linker.open_global(path.as_path())
        };

        match result {
            Ok(handle) => {
                tracing::debug!(
                    path = %path.as_path().display(),
                    handle = ?handle,
                    "Native library loaded"
                );
                Ok(handle)
            }
            Err(diagnostic) => {
                tracing::warn!(
                    path = %path.as_path().display(),
                    diagnostic = %diagnostic,
                    "Native library load failed"
                );
                Err(LoaderError::AcquireFailed {
                    path: path.as_path().to_path_buf(),
                    diagnostic,
                })
            }
        }
    }
}
