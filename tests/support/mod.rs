#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use pagesig::probe::wrap_expression;
use pagesig::{Catalog, EvaluationError, GroupKind, PageEvaluator};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;
use std::time::Duration;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn shipped_catalog_dir() -> PathBuf {
    repo_root().join("catalog")
}

pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "classify-page" => env!("CARGO_BIN_EXE_classify-page"),
        "catalog-lint" => env!("CARGO_BIN_EXE_catalog-lint"),
        other => panic!("unknown helper binary {other}"),
    };
    PathBuf::from(path)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Build a catalog from the single-document form, panicking on errors.
pub fn catalog(document: Value) -> Catalog {
    Catalog::from_value(document).expect("test catalog must load")
}

/// Write a catalog directory from the single-document form.
///
/// Missing groups are written as empty objects so the directory is complete.
pub fn write_catalog_dir(dir: &Path, document: &Value) -> Result<()> {
    let empty = Value::Object(Default::default());
    for kind in GroupKind::ALL {
        let value = match kind {
            GroupKind::Vue => document.get("vue"),
            GroupKind::Frameworks => document.get("frameworks"),
            GroupKind::Uis => document.get("uis"),
            GroupKind::Plugins => document.get("plugins"),
            GroupKind::NuxtMeta => document.pointer("/nuxt/meta"),
            GroupKind::NuxtModules => document.pointer("/nuxt/modules"),
        }
        .unwrap_or(&empty);
        fs::write(dir.join(kind.file_name()), serde_json::to_vec_pretty(value)?)?;
    }
    Ok(())
}

struct Answer {
    result: Result<Value, EvaluationError>,
    delay: Duration,
}

/// Page evaluator with scripted answers, optional latency, and a call log.
///
/// Unscripted expressions throw, like an undefined global would.
#[derive(Default)]
pub struct ScriptedRuntime {
    answers: BTreeMap<String, Answer>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, expression: &str, value: Value) -> Self {
        self.delayed(expression, value, 0)
    }

    pub fn delayed(mut self, expression: &str, value: Value, delay_ms: u64) -> Self {
        self.answers.insert(
            wrap_expression(expression),
            Answer {
                result: Ok(value),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn throws(mut self, expression: &str, message: &str) -> Self {
        self.answers.insert(
            wrap_expression(expression),
            Answer {
                result: Err(EvaluationError::Thrown {
                    message: message.to_string(),
                }),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
    }
}

#[async_trait]
impl PageEvaluator for ScriptedRuntime {
    async fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(expression.to_string());
        let Some(answer) = self.answers.get(expression) else {
            return Err(EvaluationError::Thrown {
                message: format!("ReferenceError: {expression} is not defined"),
            });
        };
        if !answer.delay.is_zero() {
            tokio::time::sleep(answer.delay).await;
        }
        answer.result.clone()
    }
}
