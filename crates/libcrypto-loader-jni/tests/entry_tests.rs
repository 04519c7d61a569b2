//! Tests for the JNI entry point's load logic, driven through fakes.

use accp_lc_loader::{load_lib_crypto, load_lib_crypto_with, loader_config};
use libcrypto_loader::{
    CANARY_SYMBOL, HostContext, LOAD_FAILURE_CLASS, LoadLatch, LoaderConfig, NULL_ARGUMENT_CLASS,
};
use libcrypto_loader_test_helpers::prelude::*;
use tracing_test::traced_test;

const LIBCRYPTO: &str = "/opt/accp/lib/libcrypto.so";

#[test]
fn test_default_config_is_used() {
    assert_eq!(loader_config(), &LoaderConfig::default());
    assert_eq!(loader_config().canary_symbol.to_string(), CANARY_SYMBOL);
}

#[test]
#[traced_test]
fn test_true_then_false() {
    let linker = FakeLinker::new().with_image(LIBCRYPTO, &[CANARY_SYMBOL]);
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    assert!(load_lib_crypto(&linker, loader_config(), &latch, &mut host, Some(LIBCRYPTO)));
    assert!(!load_lib_crypto(&linker, loader_config(), &latch, &mut host, Some(LIBCRYPTO)));
    assert!(host.pending().is_none());
    assert!(latch.is_loaded());
    assert!(logs_contain("About to load native library"));
}

#[test]
fn test_null_path_raises_null_pointer_exception() {
    let linker = FakeLinker::new();
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    assert!(!load_lib_crypto(&linker, loader_config(), &latch, &mut host, None));
    assert_eq!(
        host.pending(),
        Some(&RaisedException::new(NULL_ARGUMENT_CLASS, "Library file was null"))
    );
    assert_eq!(linker.open_calls(), 0);
}

#[test]
fn test_resident_library_tolerates_null_path() {
    let linker = FakeLinker::new().with_resident(CANARY_SYMBOL);
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    assert!(!load_lib_crypto(&linker, loader_config(), &latch, &mut host, None));
    assert!(host.pending().is_none());
    assert!(latch.is_loaded());
}

#[test]
fn test_missing_file_raises_runtime_crypto_exception() {
    let linker = FakeLinker::new();
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    assert!(!load_lib_crypto(&linker, loader_config(), &latch, &mut host, Some(LIBCRYPTO)));
    let pending = must_some(host.pending(), "expected a pending exception");
    assert_eq!(pending.class, LOAD_FAILURE_CLASS);
    assert!(pending.message.contains("cannot open shared object file"));
    assert!(!latch.is_loaded());
}

#[test]
fn test_resident_library_never_reads_path() {
    let linker = FakeLinker::new().with_resident(CANARY_SYMBOL);
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();
    let mut reads = 0;

    let loaded = load_lib_crypto_with(&linker, loader_config(), &latch, &mut host, |_| {
        reads += 1;
        Err::<Option<String>, _>("GetStringUTFChars failed")
    });

    assert!(!loaded);
    assert_eq!(reads, 0);
    assert!(host.pending().is_none());
    assert!(latch.is_loaded());
}

#[test]
fn test_unreadable_path_keeps_host_exception() {
    let linker = FakeLinker::new().with_image(LIBCRYPTO, &[CANARY_SYMBOL]);
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    let loaded = load_lib_crypto_with(&linker, loader_config(), &latch, &mut host, |host| {
        // Mimics the JVM queueing OutOfMemoryError during the string copy.
        must(host.throw_new("java/lang/OutOfMemoryError", "string copy"));
        Err::<Option<String>, _>("GetStringUTFChars failed")
    });

    assert!(!loaded);
    assert_eq!(linker.open_calls(), 0);
    assert_eq!(
        host.pending(),
        Some(&RaisedException::new("java/lang/OutOfMemoryError", "string copy"))
    );
    assert_eq!(host.raised().len(), 1);
}

#[test]
fn test_unreadable_path_without_host_exception_raises() {
    let linker = FakeLinker::new();
    let latch = LoadLatch::new();
    let mut host = RecordingHost::new();

    let loaded = load_lib_crypto_with(&linker, loader_config(), &latch, &mut host, |_| {
        Err::<Option<String>, _>("GetStringUTFChars failed")
    });

    assert!(!loaded);
    assert_eq!(
        host.pending(),
        Some(&RaisedException::new(LOAD_FAILURE_CLASS, "GetStringUTFChars failed"))
    );
}
