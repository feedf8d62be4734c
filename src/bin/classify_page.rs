//! Classifies captured page snapshots against the signature catalog.
//!
//! Snapshots are read from `--snapshot FILE` or stdin (a single object, a
//! JSON array, or NDJSON). Each snapshot yields one JSON line on stdout: the
//! full page report by default, or only the groups named with `--groups`.

use anyhow::{Context, Result, anyhow, bail};
use pagesig::{
    Catalog, Classifier, GroupKind, PageEvidence, PageSnapshot, find_catalog_dir, init_logging,
    parse_snapshot_stream, split_list,
};
use serde_json::{Map, Value, json};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let catalog_dir = find_catalog_dir(cli.catalog_path.as_deref())?;
    let catalog = Catalog::load(&catalog_dir)
        .with_context(|| format!("loading catalog from {}", catalog_dir.display()))?;
    let classifier = Classifier::new(&catalog);

    let input = match &cli.snapshot_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading snapshots from stdin")?;
            buffer
        }
    };
    let snapshots = parse_snapshot_stream(&input)?;

    for snapshot in &snapshots {
        debug!(url = ?snapshot.url, "classifying snapshot");
        let evidence = snapshot.evidence();
        let record = match &cli.groups {
            Some(groups) => group_record(&classifier, snapshot, &evidence, groups).await,
            None => report_record(&classifier, snapshot, &evidence).await?,
        };
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

async fn report_record(
    classifier: &Classifier<'_>,
    snapshot: &PageSnapshot,
    evidence: &PageEvidence<'_>,
) -> Result<Value> {
    let report = classifier.analyze(evidence).await;
    let mut record = Map::new();
    record.insert("url".to_string(), json!(snapshot.url));
    match serde_json::to_value(&report)? {
        Value::Object(fields) => record.extend(fields),
        other => bail!("page report serialized to unexpected shape: {other}"),
    }
    Ok(Value::Object(record))
}

async fn group_record(
    classifier: &Classifier<'_>,
    snapshot: &PageSnapshot,
    evidence: &PageEvidence<'_>,
    groups: &[GroupKind],
) -> Value {
    let mut record = Map::new();
    record.insert("url".to_string(), json!(snapshot.url));
    for kind in groups {
        let value = match kind {
            GroupKind::Vue => json!(classifier.has_vue(evidence).await),
            GroupKind::Frameworks => json!(classifier.framework(evidence).await),
            GroupKind::Uis => json!(classifier.ui(evidence).await),
            GroupKind::Plugins => json!(classifier.plugins(evidence).await),
            GroupKind::NuxtMeta => json!(classifier.nuxt_meta(evidence).await),
            GroupKind::NuxtModules => json!(classifier.nuxt_modules(evidence).await),
        };
        record.insert(kind.as_str().to_string(), value);
    }
    Value::Object(record)
}

struct Cli {
    catalog_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    groups: Option<Vec<GroupKind>>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args_os();
        let _program = args.next();
        let mut catalog_path = None;
        let mut snapshot_path = None;
        let mut groups = None;

        while let Some(arg) = args.next() {
            let arg_str = arg
                .to_str()
                .ok_or_else(|| anyhow!("invalid UTF-8 in argument"))?;
            match arg_str {
                "--catalog" => catalog_path = Some(next_path("--catalog", &mut args)?),
                "--snapshot" => snapshot_path = Some(next_path("--snapshot", &mut args)?),
                "--groups" => groups = Some(parse_groups(&next_value("--groups", &mut args)?)?),
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self {
            catalog_path,
            snapshot_path,
            groups,
        })
    }
}

fn parse_groups(raw: &str) -> Result<Vec<GroupKind>> {
    let names = split_list(raw);
    if names.is_empty() {
        bail!("--groups requires at least one group name");
    }
    names
        .iter()
        .map(|name| name.parse::<GroupKind>().map_err(|err| anyhow!(err)))
        .collect()
}

fn next_value(flag: &str, args: &mut env::ArgsOs) -> Result<String> {
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} requires a value"))?
        .into_string()
        .map_err(|_| anyhow!("{flag} must be valid UTF-8"))?;
    if value.is_empty() {
        bail!("{flag} must not be empty");
    }
    Ok(value)
}

fn next_path(flag: &str, args: &mut env::ArgsOs) -> Result<PathBuf> {
    next_value(flag, args).map(PathBuf::from)
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: classify-page [--catalog DIR] [--snapshot FILE] [--groups LIST]\n\nOptions:\n  --catalog DIR             Signature catalog directory (or set PAGESIG_CATALOG).\n  --snapshot FILE           Read page snapshots from FILE instead of stdin.\n  --groups LIST             Only report these groups (vue, frameworks, uis, plugins, nuxt.meta, nuxt.modules).\n  --help                    Show this help text."
    );
    std::process::exit(code);
}
