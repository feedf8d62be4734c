//! Validates a signature catalog and prints a per-group summary.
//!
//! Loading performs the full schema check and pattern compilation, so a zero
//! exit status means the catalog is usable by `classify-page`. Signatures
//! without any rule are reported as warnings, or as errors with `--strict`.

use anyhow::{Context, Result, anyhow, bail};
use pagesig::{Catalog, find_catalog_dir, init_logging};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use tracing::warn;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct LintSummary {
    catalog: String,
    groups: BTreeMap<&'static str, usize>,
    vacuous: Vec<String>,
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let catalog_dir = find_catalog_dir(cli.catalog_path.as_deref())?;
    let catalog = Catalog::load(&catalog_dir)
        .with_context(|| format!("loading catalog from {}", catalog_dir.display()))?;

    let vacuous: Vec<String> = catalog
        .vacuous_signatures()
        .into_iter()
        .map(|(kind, name)| format!("{kind}/{name}"))
        .collect();
    for entry in &vacuous {
        warn!(signature = %entry, "signature declares no evidence rule and never matches");
    }

    let summary = LintSummary {
        catalog: catalog_dir.display().to_string(),
        groups: catalog
            .counts()
            .into_iter()
            .map(|(kind, count)| (kind.as_str(), count))
            .collect(),
        vacuous,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if cli.strict && !summary.vacuous.is_empty() {
        bail!(
            "{} signature(s) declare no evidence rule:\n{}",
            summary.vacuous.len(),
            summary.vacuous.join("\n")
        );
    }
    Ok(())
}

struct Cli {
    catalog_path: Option<PathBuf>,
    strict: bool,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut catalog_path = None;
        let mut strict = false;

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--catalog" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--catalog requires a value"))?;
                    let path = PathBuf::from(value);
                    if path.as_os_str().is_empty() {
                        bail!("--catalog must not be empty");
                    }
                    catalog_path = Some(path);
                }
                "--strict" => strict = true,
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self {
            catalog_path,
            strict,
        })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: catalog-lint [--catalog DIR] [--strict]\n\nOptions:\n  --catalog DIR             Signature catalog directory (or set PAGESIG_CATALOG).\n  --strict                  Fail when a signature declares no evidence rule.\n  --help                    Show this help text."
    );
    std::process::exit(code);
}
