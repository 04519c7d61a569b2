//! Bakes the mangled canary symbol name into the crate.
//!
//! The native libcrypto may be built with a symbol prefix (`AWSLC_MANGLE`) so
//! that it can coexist with other copies of libcrypto in the same process. The
//! canary must carry the same prefix or the probe will never match.

const CANARY_BASE: &str = "CRYPTO_library_init";

fn main() {
    println!("cargo:rerun-if-env-changed=AWSLC_MANGLE");
    let prefix = std::env::var("AWSLC_MANGLE").unwrap_or_default();
    println!("cargo:rustc-env=LIBCRYPTO_CANARY_SYMBOL={prefix}{CANARY_BASE}");
    println!("cargo:rustc-env=LIBCRYPTO_UNMANGLED_SYMBOL={CANARY_BASE}");
}
