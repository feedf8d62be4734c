//! Runtime expression probes against a live page.
//!
//! The page-automation layer is abstracted as [`PageEvaluator`]. A probe wraps
//! the catalog expression in `Boolean(...)`, evaluates it and coerces the
//! result with JavaScript truthiness.
//!
//! This is the only place where a failure is turned into a negative result:
//! an expression that throws, or a page that disappears mid-evaluation, means
//! "this signature has no runtime evidence", never an aborted classification.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Why a page evaluation did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The expression itself threw (syntax, reference, or runtime error).
    #[error("expression threw: {message}")]
    Thrown { message: String },
    /// The page could not be reached: navigation, closed target, timeout.
    #[error("page unavailable: {message}")]
    Unavailable { message: String },
}

/// Capability to evaluate an expression inside the page runtime.
///
/// Implementations own timeouts and the serialization of concurrent calls;
/// the engine issues read-only expressions and may have several pending at
/// once.
#[async_trait]
pub trait PageEvaluator: Send + Sync {
    async fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError>;
}

/// The exact text sent to the evaluator for a catalog expression.
pub fn wrap_expression(expression: &str) -> String {
    format!("Boolean({expression})")
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Evaluate one expression; any evaluation failure reads as `false`.
pub async fn probe(runtime: &dyn PageEvaluator, expression: &str) -> bool {
    match runtime.evaluate(&wrap_expression(expression)).await {
        Ok(value) => is_truthy(&value),
        Err(_) => false,
    }
}

/// Evaluate expressions in order until one is truthy.
pub async fn probe_any<S: AsRef<str>>(runtime: &dyn PageEvaluator, expressions: &[S]) -> bool {
    for expression in expressions {
        if probe(runtime, expression.as_ref()).await {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        calls: Mutex<Vec<String>>,
        answer: fn(&str) -> Result<Value, EvaluationError>,
    }

    #[async_trait]
    impl PageEvaluator for Scripted {
        async fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
            self.calls
                .lock()
                .unwrap_or_else(|err| err.into_inner())
                .push(expression.to_string());
            (self.answer)(expression)
        }
    }

    fn scripted(answer: fn(&str) -> Result<Value, EvaluationError>) -> Scripted {
        Scripted {
            calls: Mutex::new(Vec::new()),
            answer,
        }
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[tokio::test]
    async fn probe_wraps_expression_in_boolean() {
        let runtime = scripted(|_| Ok(json!(true)));
        assert!(probe(&runtime, "window.Vue").await);
        assert_eq!(
            *runtime.calls.lock().unwrap(),
            vec!["Boolean(window.Vue)".to_string()]
        );
    }

    #[tokio::test]
    async fn thrown_expression_is_no_match() {
        let runtime = scripted(|_| {
            Err(EvaluationError::Thrown {
                message: "ReferenceError: __NONEXISTENT__ is not defined".into(),
            })
        });
        assert!(!probe(&runtime, "window.__NONEXISTENT__.flag").await);
    }

    #[tokio::test]
    async fn unavailable_page_is_no_match() {
        let runtime = scripted(|_| {
            Err(EvaluationError::Unavailable {
                message: "target closed".into(),
            })
        });
        assert!(!probe(&runtime, "window.$nuxt").await);
    }

    #[tokio::test]
    async fn probe_any_stops_at_first_truthy() {
        let runtime = scripted(|expression| match expression {
            "Boolean(a)" => Err(EvaluationError::Thrown {
                message: "boom".into(),
            }),
            "Boolean(b)" => Ok(json!(1)),
            _ => Ok(json!(true)),
        });
        assert!(probe_any(&runtime, &["a", "b", "c"]).await);
        assert_eq!(
            *runtime.calls.lock().unwrap(),
            vec!["Boolean(a)".to_string(), "Boolean(b)".to_string()]
        );
    }

    #[tokio::test]
    async fn probe_any_with_no_expressions_is_false() {
        let runtime = scripted(|_| Ok(json!(true)));
        assert!(!probe_any::<&str>(&runtime, &[]).await);
        assert!(runtime.calls.lock().unwrap().is_empty());
    }
}
