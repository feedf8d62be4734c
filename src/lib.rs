//! Page signature classifier.
//!
//! The crate matches a rendered page against a catalog of named signatures
//! (frameworks, UI libraries, plugins, Nuxt feature flags and modules) using
//! three evidence channels: the page markup, the URIs of its scripts, and
//! expressions evaluated in the live page runtime. Public functions here form
//! the contract the helper binaries depend on: catalog discovery, logging
//! setup, and list parsing for command-line flags.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod classify;
pub mod evidence;
pub mod pattern;
pub mod probe;
mod schema_loader;
pub mod signature;
pub mod snapshot;

pub use catalog::{Catalog, GroupKind, NuxtCatalog, SignatureDefinition, SignatureName};
pub use classify::{Classifier, NUXT_FRAMEWORK, PageReport};
pub use evidence::PageEvidence;
pub use pattern::{Pattern, PatternError, PatternSet};
pub use probe::{EvaluationError, PageEvaluator, probe, probe_any};
pub use signature::{Signature, SignatureGroup};
pub use snapshot::{PageSnapshot, RecordedRuntime, parse_snapshot_stream};

const CATALOG_ENV: &str = "PAGESIG_CATALOG";
const CATALOG_DIR_NAME: &str = "catalog";
const CATALOG_SENTINEL: &str = "frameworks.json";

/// Returns true when `candidate` looks like a catalog directory.
fn is_catalog_dir(candidate: &Path) -> bool {
    candidate.join(CATALOG_SENTINEL).is_file()
}

fn catalog_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_catalog_dir(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(CATALOG_DIR_NAME);
        if is_catalog_dir(&candidate) {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the signature catalog directory.
///
/// An explicit path (from `--catalog`) must be a catalog; otherwise
/// `PAGESIG_CATALOG` is honored when it points at one, then a `catalog/`
/// directory above the current executable, then the build-time hint.
pub fn find_catalog_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !is_catalog_dir(path) {
            bail!(
                "{} is not a signature catalog (missing {CATALOG_SENTINEL})",
                path.display()
            );
        }
        return Ok(fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
    }

    if let Ok(env_dir) = env::var(CATALOG_ENV) {
        if let Some(dir) = catalog_from_hint(&env_dir) {
            return Ok(dir);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(dir) = search_upwards(exe_dir) {
                return Ok(dir);
            }
        }
    }

    if let Some(hint) = option_env!("PAGESIG_CATALOG_HINT") {
        if let Some(dir) = catalog_from_hint(hint) {
            return Ok(dir);
        }
    }

    bail!("Unable to locate a signature catalog. Pass --catalog DIR or set {CATALOG_ENV}.");
}

/// Split comma- or whitespace-delimited flag values into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Install the stderr tracing subscriber used by the binaries.
///
/// `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
