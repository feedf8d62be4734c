//! JSON Schema loading for catalog files.
//!
//! One schema describes a name-keyed signature group; the single-definition
//! schema used for `vue.json` is derived from its `definitions/signature`
//! entry so both stay aligned. A catalog directory may carry its own
//! `signature_group.schema.json`; otherwise the copy shipped with the crate
//! is used.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::{Value, json};
use std::fs::File;
use std::path::Path;

pub(crate) const SCHEMA_FILE_NAME: &str = "signature_group.schema.json";

const BUNDLED_SCHEMA: &str = include_str!("../schema/signature_group.schema.json");

/// Compiled validators for group files and single definitions.
pub(crate) struct SignatureSchemas {
    pub group: JSONSchema,
    pub definition: JSONSchema,
}

impl SignatureSchemas {
    /// Load the schema next to `catalog_dir` when present, else the bundled one.
    pub(crate) fn for_catalog_dir(catalog_dir: &Path) -> Result<Self> {
        let local = catalog_dir.join(SCHEMA_FILE_NAME);
        if local.is_file() {
            let value: Value = serde_json::from_reader(
                File::open(&local).with_context(|| format!("opening schema {}", local.display()))?,
            )
            .with_context(|| format!("parsing schema {}", local.display()))?;
            return Self::from_value(value)
                .with_context(|| format!("compiling schema {}", local.display()));
        }
        Self::bundled()
    }

    pub(crate) fn bundled() -> Result<Self> {
        let value: Value =
            serde_json::from_str(BUNDLED_SCHEMA).context("parsing bundled signature schema")?;
        Self::from_value(value).context("compiling bundled signature schema")
    }

    fn from_value(raw: Value) -> Result<Self> {
        let signature = raw
            .pointer("/definitions/signature")
            .ok_or_else(|| anyhow!("schema missing definitions/signature"))?;
        if !signature.is_object() {
            bail!("schema definitions/signature must be an object");
        }
        let definitions = raw
            .get("definitions")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let definition_schema = json!({
            "$schema": raw.get("$schema").cloned().unwrap_or(Value::Null),
            "definitions": definitions,
            "allOf": [{ "$ref": "#/definitions/signature" }]
        });
        let definition_schema = strip_null_schema_keyword(definition_schema);

        let group = compile(&raw)?;
        let definition = compile(&definition_schema)?;
        Ok(Self { group, definition })
    }
}

/// Validate `instance`, collecting every violation into one error.
pub(crate) fn validate(schema: &JSONSchema, instance: &Value, what: &str) -> Result<()> {
    if let Err(errors) = schema.validate(instance) {
        let details = errors
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{path}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{what} failed schema validation:\n{details}");
    }
    Ok(())
}

fn compile(schema: &Value) -> Result<JSONSchema> {
    JSONSchema::compile(schema).map_err(|err| anyhow!("invalid JSON schema: {err}"))
}

fn strip_null_schema_keyword(mut schema: Value) -> Value {
    if let Some(object) = schema.as_object_mut() {
        if object.get("$schema").is_some_and(Value::is_null) {
            object.remove("$schema");
        }
    }
    schema
}
