//! Pattern compilation and matching for the markup and script channels.
//!
//! Catalog patterns use the Wappalyzer notation: a regular expression
//! optionally followed by `\;`-separated `key:value` attributes, e.g.
//! `vue(?:\.min)?\.js\;version:\1\;confidence:50`. The expression is compiled
//! case-insensitively. `version` and `confidence` are carried on the compiled
//! [`Pattern`] but never influence whether it matches. Other attributes, and
//! segments that are not `key:value`, are logged and dropped so catalogs
//! written for richer tooling still load.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::warn;

const ATTRIBUTE_SEPARATOR: &str = "\\;";

/// Failure to turn a catalog pattern string into a matcher.
///
/// These surface while loading a catalog; nothing at match time can fail.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern {source_text:?} has an empty expression")]
    EmptyExpression { source_text: String },
    #[error("pattern {source_text:?} does not compile: {reason}")]
    InvalidRegex {
        source_text: String,
        reason: String,
    },
    #[error("pattern {source_text:?} has confidence {value:?}; expected an integer in 0..=100")]
    InvalidConfidence { source_text: String, value: String },
}

/// One compiled catalog pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    version: Option<String>,
    confidence: Option<u8>,
}

impl Pattern {
    /// Compile a single pattern string.
    pub fn compile(spec: &str) -> Result<Self, PatternError> {
        let mut segments = spec.split(ATTRIBUTE_SEPARATOR);
        let expression = segments.next().unwrap_or_default();
        if expression.is_empty() {
            return Err(PatternError::EmptyExpression {
                source_text: spec.to_string(),
            });
        }
        let regex = RegexBuilder::new(expression)
            .case_insensitive(true)
            .build()
            .map_err(|err| PatternError::InvalidRegex {
                source_text: spec.to_string(),
                reason: err.to_string(),
            })?;

        let mut version = None;
        let mut confidence = None;
        for attribute in segments {
            let Some((key, value)) = attribute.split_once(':') else {
                warn!(pattern = spec, attribute, "ignoring pattern attribute without a value");
                continue;
            };
            match key {
                "version" => version = Some(value.to_string()),
                "confidence" => {
                    let parsed = value
                        .trim()
                        .parse::<u8>()
                        .ok()
                        .filter(|value| *value <= 100)
                        .ok_or_else(|| PatternError::InvalidConfidence {
                            source_text: spec.to_string(),
                            value: value.to_string(),
                        })?;
                    confidence = Some(parsed);
                }
                other => {
                    warn!(pattern = spec, key = other, "ignoring unknown pattern attribute");
                }
            }
        }

        Ok(Self {
            source: spec.to_string(),
            regex,
            version,
            confidence,
        })
    }

    pub fn test(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The pattern exactly as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn confidence(&self) -> Option<u8> {
        self.confidence
    }
}

/// Zero or more compiled patterns for one evidence channel.
///
/// An empty set stands for "no rule on this channel" and matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first bad one.
    pub fn compile<S: AsRef<str>>(specs: &[S]) -> Result<Self, PatternError> {
        let patterns = specs
            .iter()
            .map(|spec| Pattern::compile(spec.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// True when any pattern matches `text`.
    pub fn matches_text(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.test(text))
    }

    /// True when any pattern matches any of `candidates`.
    pub fn matches_any<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        self.patterns.iter().any(|pattern| {
            candidates
                .iter()
                .any(|candidate| pattern.test(candidate.as_ref()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_expression_matches_case_insensitively() {
        let pattern = Pattern::compile("<div id=\"app\">").unwrap();
        assert!(pattern.test("<DIV ID=\"app\">hi</DIV>"));
        assert!(!pattern.test("<div id=\"root\">"));
        assert_eq!(pattern.version(), None);
        assert_eq!(pattern.confidence(), None);
    }

    #[test]
    fn attributes_are_parsed_and_do_not_affect_matching() {
        let pattern = Pattern::compile("vue(?:\\.min)?\\.js\\;version:\\1\\;confidence:50").unwrap();
        assert_eq!(pattern.version(), Some("\\1"));
        assert_eq!(pattern.confidence(), Some(50));
        assert!(pattern.test("https://cdn.example.com/vue.min.js"));
        assert_eq!(
            pattern.source(),
            "vue(?:\\.min)?\\.js\\;version:\\1\\;confidence:50"
        );
    }

    #[test]
    fn version_values_may_contain_colons() {
        let pattern = Pattern::compile("nuxt\\;version:\\1?a:b").unwrap();
        assert_eq!(pattern.version(), Some("\\1?a:b"));
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(matches!(
            Pattern::compile(""),
            Err(PatternError::EmptyExpression { .. })
        ));
        assert!(matches!(
            Pattern::compile("\\;version:1"),
            Err(PatternError::EmptyExpression { .. })
        ));
        assert!(matches!(
            Pattern::compile("foo(bar"),
            Err(PatternError::InvalidRegex { .. })
        ));
        assert!(matches!(
            Pattern::compile("foo\\;confidence:150"),
            Err(PatternError::InvalidConfidence { .. })
        ));
    }

    #[test]
    fn unknown_and_bare_attributes_are_ignored() {
        let pattern = Pattern::compile("vuetify\\;implies:Vue\\;weird\\;version:2").unwrap();
        assert!(pattern.test("<div class=\"v-application vuetify\">"));
        assert_eq!(pattern.version(), Some("2"));
        assert_eq!(pattern.confidence(), None);
        assert_eq!(pattern.source(), "vuetify\\;implies:Vue\\;weird\\;version:2");
    }

    #[test]
    fn set_matches_any_pattern_against_text() {
        let set = PatternSet::compile(&["data-v-[0-9a-f]{8}", "__vue__"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.matches_text("<p data-v-1a2b3c4d>"));
        assert!(set.matches_text("window.__VUE__"));
        assert!(!set.matches_text("<p>plain</p>"));
    }

    #[test]
    fn set_cross_matches_candidates() {
        let set = PatternSet::compile(&["vuex", "vue-router"]).unwrap();
        let scripts = vec![
            "https://cdn.example.com/app.js".to_string(),
            "https://cdn.example.com/vue-router.js".to_string(),
        ];
        assert!(set.matches_any(&scripts));
        assert!(!set.matches_any(&scripts[..1]));
        assert!(!set.matches_any::<String>(&[]));
    }

    #[test]
    fn empty_set_never_matches() {
        let set = PatternSet::default();
        assert!(set.is_empty());
        assert!(!set.matches_text("anything at all"));
        assert!(!set.matches_any(&["anything"]));
    }
}
