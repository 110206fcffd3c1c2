//! Purpose: Compile the libcrypto BIGNUM shim and link the system libcrypto for Rust FFI.
//! Role: Cargo build-script; configures `cc` inputs/includes and rebuild triggers.
//! Invariants: `cargo:rerun-if-changed` covers the shim sources.
//! Invariants: `cargo:rerun-if-env-changed` covers every OpenSSL location override.
//! Invariants: Produces a `bnconv_shim` object library linked ahead of `crypto`.
use std::env;
use std::path::PathBuf;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));

    println!("cargo:rerun-if-changed=c/bn_shim.c");
    println!("cargo:rerun-if-changed=c/bn_shim.h");
    println!("cargo:rerun-if-env-changed=OPENSSL_DIR");
    println!("cargo:rerun-if-env-changed=OPENSSL_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=OPENSSL_LIB_DIR");

    let (include_dir, lib_dir) = openssl_dirs();

    let mut build = cc::Build::new();
    build
        .include(manifest_dir.join("c"))
        .file(manifest_dir.join("c").join("bn_shim.c"));
    if let Some(include_dir) = &include_dir {
        build.include(include_dir);
    }
    if !target.contains("windows-msvc") {
        build.flag_if_supported("-std=c11");
    }
    build.compile("bnconv_shim");

    if let Some(lib_dir) = &lib_dir {
        println!("cargo:rustc-link-search=native={}", lib_dir.display());
    }
    if target.contains("windows-msvc") {
        println!("cargo:rustc-link-lib=libcrypto");
    } else {
        println!("cargo:rustc-link-lib=crypto");
    }
}

fn openssl_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    let root = env::var_os("OPENSSL_DIR").map(PathBuf::from);
    let include_dir = env::var_os("OPENSSL_INCLUDE_DIR")
        .map(PathBuf::from)
        .or_else(|| root.as_ref().map(|root| root.join("include")));
    let lib_dir = env::var_os("OPENSSL_LIB_DIR")
        .map(PathBuf::from)
        .or_else(|| root.as_ref().map(|root| root.join("lib")));
    (include_dir, lib_dir)
}
