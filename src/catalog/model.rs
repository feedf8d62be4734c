//! Deserializable representation of the catalog JSON files.
//!
//! The types mirror what is stored on disk so tests and tooling can reason
//! about definitions without ad-hoc JSON handling. Nothing here compiles
//! patterns; use `Catalog` for the validated, compiled form.

use crate::catalog::identity::SignatureName;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A rule value that may be absent, a single string, or a list.
///
/// Normalized at deserialization so callers only ever iterate; `null`, `""`
/// and a missing key all become an empty list. Empty strings inside a list are
/// left alone and rejected by the schema.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OneOrMany(pub Vec<String>);

impl OneOrMany {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for OneOrMany {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Shape>::deserialize(deserializer)? {
            None => OneOrMany::default(),
            Some(Shape::One(value)) if value.is_empty() => OneOrMany::default(),
            Some(Shape::One(value)) => OneOrMany(vec![value]),
            Some(Shape::Many(values)) => OneOrMany(values),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
/// One signature as written in the catalog: up to three evidence rules.
pub struct SignatureDefinition {
    /// Patterns tested against the page markup.
    #[serde(default)]
    pub html: OneOrMany,
    /// Patterns tested against every loaded script URI.
    #[serde(default)]
    pub script: OneOrMany,
    /// Expressions evaluated in the page runtime.
    #[serde(default)]
    pub js: OneOrMany,
}

impl SignatureDefinition {
    /// True when the definition declares no evidence rule at all.
    pub fn is_vacuous(&self) -> bool {
        self.html.is_empty() && self.script.is_empty() && self.js.is_empty()
    }
}

/// A group file in declaration order.
pub type DefinitionList = Vec<(SignatureName, SignatureDefinition)>;

/// Turn a name-keyed group object into definitions, keeping key order.
pub(crate) fn parse_group(value: Value) -> Result<DefinitionList> {
    let Value::Object(entries) = value else {
        bail!("signature group must be a JSON object keyed by signature name");
    };
    definitions_from_map(entries)
}

fn definitions_from_map(entries: Map<String, Value>) -> Result<DefinitionList> {
    entries
        .into_iter()
        .map(|(name, raw)| {
            let definition: SignatureDefinition = serde_json::from_value(raw)
                .with_context(|| format!("signature '{name}'"))?;
            Ok((SignatureName(name), definition))
        })
        .collect()
}
