//! Bakes the default signature catalog location into the crate.
//!
//! `find_catalog_dir` falls back to this when neither `--catalog` nor
//! `PAGESIG_CATALOG` names a catalog at runtime.

use std::env;
use std::path::PathBuf;

const HINT_VAR: &str = "PAGESIG_CATALOG_HINT";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={HINT_VAR}");

    if let Some(dir) = default_catalog_dir().filter(|dir| dir.is_dir()) {
        println!("cargo:rustc-env={HINT_VAR}={}", dir.display());
    }
}

fn default_catalog_dir() -> Option<PathBuf> {
    let dir = match env::var_os(HINT_VAR) {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?).join("catalog"),
    };
    Some(dir.canonicalize().unwrap_or(dir))
}
