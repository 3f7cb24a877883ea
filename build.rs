// Licensed under the Apache-2.0 license

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // The interrupt vector table and memory layout are only linked into
    // target images built with the `rt` feature.
    if env::var_os("CARGO_FEATURE_RT").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
        fs::copy("device.x", out.join("device.x")).expect("copy device.x");
        fs::copy("memory.x", out.join("memory.x")).expect("copy memory.x");
        println!("cargo:rustc-link-search={}", out.display());
    }

    println!("cargo:rerun-if-changed=device.x");
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
