//! JNI binding for the Java provider's `Loader.loadLibCrypto(String)`.
//!
//! The Java side calls this before touching any other native method. It
//! returns `true` only when this call loaded libcrypto; `false` means either
//! that libcrypto was already resident or that an exception is now pending.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod host;

use std::convert::Infallible;
use std::fmt;
use std::sync::OnceLock;

use jni::JNIEnv;
use jni::objects::{JClass, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean};
use libcrypto_loader::{
    DynamicLinker, HostContext, LoadLatch, LoadOrchestrator, LoaderConfig, SystemLinker,
    init_diagnostics_from_env,
};

pub use host::JniHost;

/// Process-wide record of whether libcrypto has been seen loaded.
pub static LOAD_LATCH: LoadLatch = LoadLatch::new();

static CONFIG: OnceLock<LoaderConfig> = OnceLock::new();

/// The configuration used by the entry point.
pub fn loader_config() -> &'static LoaderConfig {
    CONFIG.get_or_init(LoaderConfig::default)
}

/// Run the load protocol and convert the outcome to the Java return value.
pub fn load_lib_crypto<L, H>(
    linker: L,
    config: &LoaderConfig,
    latch: &LoadLatch,
    host: &mut H,
    path: Option<&str>,
) -> bool
where
    L: DynamicLinker + Copy,
    H: HostContext + ?Sized,
{
    load_lib_crypto_with(linker, config, latch, host, |_| {
        Ok::<_, Infallible>(path.map(str::to_owned))
    })
}

/// [`load_lib_crypto`] with the path read from the host only when the
/// library is not already resident.
pub fn load_lib_crypto_with<L, H, F, E>(
    linker: L,
    config: &LoaderConfig,
    latch: &LoadLatch,
    host: &mut H,
    read_path: F,
) -> bool
where
    L: DynamicLinker + Copy,
    H: HostContext + ?Sized,
    F: FnOnce(&mut H) -> Result<Option<String>, E>,
    E: fmt::Display,
{
    LoadOrchestrator::new(linker, config)
        .with_latch(latch)
        .load_with(host, read_path)
        .performed_load()
}

/// `static native boolean loadLibCrypto(String libPath)` on
/// `com.amazon.corretto.crypto.provider.Loader`.
#[expect(unsafe_code, reason = "exported under the JNI symbol name")]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_amazon_corretto_crypto_provider_Loader_loadLibCrypto<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    lib_path: JString<'local>,
) -> jboolean {
    init_diagnostics_from_env();

    let mut host = JniHost::new(&mut env);
    // A failed GetStringUTFChars leaves its own exception pending.
    let loaded = load_lib_crypto_with(
        SystemLinker::new(),
        loader_config(),
        &LOAD_LATCH,
        &mut host,
        |host| host.read_string(&lib_path),
    );

    if loaded { JNI_TRUE } else { JNI_FALSE }
}
