//! Build script for ren-ffi.
//!
//! Regenerates the C header `include/ren_sdk.h` from the exported functions with
//! `cbindgen`. The committed header is kept when generation fails, so a broken
//! header never breaks the library build.
//!
//! # Environment variables
//!
//! - `REN_SKIP_HEADER`: when set (any value), skips header generation.
//! - `DOCS_RS`: set by docs.rs, where the sandbox is read-only.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=REN_SKIP_HEADER");
    println!("cargo:rerun-if-env-changed=DOCS_RS");

    if env::var_os("DOCS_RS").is_some() || env::var_os("REN_SKIP_HEADER").is_some() {
        return;
    }

    let crate_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let config = match cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")) {
        Ok(config) => config,
        Err(e) => {
            println!("cargo:warning=cbindgen.toml unreadable, header not regenerated: {e}");
            return;
        }
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(crate_dir.join("include").join("ren_sdk.h"));
        }
        Err(e) => println!("cargo:warning=header not regenerated: {e}"),
    }
}
