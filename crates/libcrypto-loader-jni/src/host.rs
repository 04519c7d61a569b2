//! [`HostContext`] over a JNI call frame.

use jni::JNIEnv;
use jni::errors::Error as JniError;
use jni::objects::JString;
use libcrypto_loader::{HostContext, ThrowError};

/// Raises exceptions on the Java thread that made the native call.
pub struct JniHost<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
}

impl<'a, 'local> JniHost<'a, 'local> {
    /// Wrap the environment passed to the native method.
    pub fn new(env: &'a mut JNIEnv<'local>) -> Self {
        Self { env }
    }

    /// Copy a Java string argument. A Java `null` reads as `None`.
    ///
    /// The UTF chars are released before this returns.
    pub fn read_string(&mut self, value: &JString<'_>) -> jni::errors::Result<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }
        let value: String = self.env.get_string(value)?.into();
        Ok(Some(value))
    }
}

impl HostContext for JniHost<'_, '_> {
    fn exception_pending(&mut self) -> bool {
        // If the check itself fails the frame is unusable; treat that as
        // pending so nothing is thrown over it.
        self.env.exception_check().unwrap_or(true)
    }

    fn throw_new(&mut self, class: &str, message: &str) -> Result<(), ThrowError> {
        // A failed FindClass leaves NoClassDefFoundError pending on the thread.
        let ex_class = self.env.find_class(class).map_err(|err| {
            tracing::debug!(class, error = %err, "FindClass failed");
            ThrowError::ClassNotFound {
                class: class.to_string(),
            }
        })?;

        let result = self.env.throw_new(&ex_class, message);
        if let Err(err) = self.env.delete_local_ref(ex_class) {
            tracing::trace!(error = %err, "DeleteLocalRef failed");
        }

        match result {
            Ok(()) => Ok(()),
            Err(JniError::ThrowFailed(code)) => Err(ThrowError::Rejected {
                class: class.to_string(),
                code,
            }),
            Err(err) => {
                tracing::debug!(class, error = %err, "ThrowNew failed");
                Err(ThrowError::Rejected {
                    class: class.to_string(),
                    code: jni::sys::JNI_ERR,
                })
            }
        }
    }

    fn fatal_error(&mut self, message: &str) -> ! {
        self.env.fatal_error(message)
    }
}
