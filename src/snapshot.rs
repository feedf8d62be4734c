//! Offline page snapshots.
//!
//! A snapshot is what a page-automation run captured for one URL: markup,
//! script URIs, and the values some runtime expressions evaluated to. It lets
//! the classifier run without a browser, which is what `classify-page` and
//! the test-suite do.

use crate::evidence::PageEvidence;
use crate::probe::{EvaluationError, PageEvaluator, wrap_expression};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Page evaluator answering from recorded expression values.
///
/// Answers are keyed by the catalog expression (e.g. `window.$nuxt`). Any
/// expression that was not recorded fails like an undefined reference would
/// in the page.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct RecordedRuntime {
    answers: BTreeMap<String, Value>,
    evaluations: AtomicUsize,
}

impl RecordedRuntime {
    pub fn new<I, K>(answers: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        Self {
            answers: answers
                .into_iter()
                .map(|(expression, value)| (wrap_expression(expression.as_ref()), value))
                .collect(),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Number of `evaluate` calls served so far, recorded or not.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl From<BTreeMap<String, Value>> for RecordedRuntime {
    fn from(answers: BTreeMap<String, Value>) -> Self {
        Self::new(answers)
    }
}

#[async_trait]
impl PageEvaluator for RecordedRuntime {
    async fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(expression)
            .cloned()
            .ok_or_else(|| EvaluationError::Thrown {
                message: format!("ReferenceError: {expression} is not recorded"),
            })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Captured evidence for one page.
pub struct PageSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "html")]
    pub markup: String,
    #[serde(default, alias = "scripts")]
    pub script_uris: Vec<String>,
    #[serde(default)]
    pub runtime: RecordedRuntime,
}

impl PageSnapshot {
    pub fn evidence(&self) -> PageEvidence<'_> {
        PageEvidence::new(&self.markup, &self.script_uris, &self.runtime)
    }
}

/// Parse snapshots from a single object, a JSON array, or NDJSON.
///
/// Empty input is an error; NDJSON lines are reported with their line number.
pub fn parse_snapshot_stream(input: &str) -> Result<Vec<PageSnapshot>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No page snapshots provided");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .context("Unable to parse JSON array of page snapshots"),
            Value::Object(_) => serde_json::from_value(value)
                .map(|snapshot| vec![snapshot])
                .context("Unable to parse page snapshot"),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut snapshots = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let snapshot: PageSnapshot = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse page snapshot from line {}", idx + 1))?;
        snapshots.push(snapshot);
    }

    if snapshots.is_empty() {
        bail!("No page snapshots found in input stream");
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn recorded_runtime_answers_wrapped_expressions() {
        let runtime = RecordedRuntime::new([("window.$nuxt", json!(true))]);
        assert_eq!(
            runtime.evaluate("Boolean(window.$nuxt)").await,
            Ok(json!(true))
        );
        assert!(matches!(
            runtime.evaluate("Boolean(window.Vue)").await,
            Err(EvaluationError::Thrown { .. })
        ));
        assert_eq!(runtime.evaluations(), 2);
    }

    #[test]
    fn snapshot_accepts_short_field_names() {
        let snapshot: PageSnapshot = serde_json::from_value(json!({
            "url": "https://example.com",
            "html": "<div id=\"app\"></div>",
            "scripts": ["https://example.com/app.js"],
            "runtime": {"window.Vue": {"version": "2.6.14"}}
        }))
        .unwrap();
        assert_eq!(snapshot.url.as_deref(), Some("https://example.com"));
        assert_eq!(snapshot.script_uris.len(), 1);
        let evidence = snapshot.evidence();
        assert!(evidence.markup.contains("app"));
    }

    #[test]
    fn snapshot_rejects_unknown_fields() {
        assert!(serde_json::from_value::<PageSnapshot>(json!({"headers": {}})).is_err());
    }

    #[test]
    fn stream_accepts_object_array_and_ndjson() {
        assert_eq!(parse_snapshot_stream("{\"markup\": \"a\"}").unwrap().len(), 1);
        assert_eq!(
            parse_snapshot_stream("[{\"markup\": \"a\"}, {\"markup\": \"b\"}]")
                .unwrap()
                .len(),
            2
        );
        let ndjson = "{\"markup\": \"a\"}\n\n{\"scripts\": [\"b.js\"]}\n";
        let parsed = parse_snapshot_stream(ndjson).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].script_uris, vec!["b.js".to_string()]);
    }

    #[test]
    fn stream_rejects_empty_and_broken_input() {
        assert!(parse_snapshot_stream("   ").is_err());
        assert!(parse_snapshot_stream("42").is_err());
        let err = parse_snapshot_stream("{\"markup\": \"a\"}\nnot json").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
