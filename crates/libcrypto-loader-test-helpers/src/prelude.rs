//! Convenience re-exports for common test utilities.

pub use crate::must::{must, must_some, must_with};

#[cfg(feature = "mock")]
pub use crate::mock::{FakeLinker, RaisedException, RecordingHost};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
