//! Turning load failures into host exceptions.

use crate::error::ThrowError;

/// The host runtime's exception protocol for the current call.
pub trait HostContext {
    /// Whether an exception is already queued on this call.
    fn exception_pending(&mut self) -> bool;

    /// Resolve `class` and queue a new exception of it carrying `message`.
    fn throw_new(&mut self, class: &str, message: &str) -> Result<(), ThrowError>;

    /// Abort the process through the host. Does not return.
    fn fatal_error(&mut self, message: &str) -> !;
}

/// What [`translate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// A new exception is now pending.
    Raised,
    /// Another exception was already pending and was left untouched.
    AlreadyPending,
    /// The exception class could not be resolved; the host's own lookup
    /// failure is pending instead.
    ClassMissing,
}

/// Message passed to the host when it refuses a raise.
pub const THROW_REJECTED_MESSAGE: &str = "ThrowNew returned error";

/// Raise `class` with `message` unless an exception is already pending.
///
/// The first pending exception always wins. If the host refuses the raise the
/// call/exception protocol is in an unknown state and the process is taken
/// down via [`HostContext::fatal_error`].
pub fn translate<H: HostContext + ?Sized>(host: &mut H, class: &str, message: &str) -> Translation {
    if host.exception_pending() {
        tracing::debug!(class, message, "Exception already pending; not raising");
        return Translation::AlreadyPending;
    }

    match host.throw_new(class, message) {
        Ok(()) => Translation::Raised,
        Err(ThrowError::ClassNotFound { class }) => {
            tracing::error!(class = %class, "Exception class not found");
            Translation::ClassMissing
        }
        Err(err @ ThrowError::Rejected { .. }) => {
            tracing::error!(error = %err, "Host rejected exception");
            host.fatal_error(THROW_REJECTED_MESSAGE)
        }
    }
}
