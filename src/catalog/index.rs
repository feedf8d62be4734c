//! Validated, compiled view of a signature catalog.
//!
//! Loading is strict: every group file is checked against the signature
//! schema, every pattern is compiled, and the first problem aborts the load.
//! Once built, a `Catalog` is immutable and is shared by reference across
//! classification calls.

use crate::catalog::identity::{GroupKind, SignatureName};
use crate::catalog::model::{SignatureDefinition, parse_group};
use crate::schema_loader::{SignatureSchemas, validate};
use crate::signature::{Signature, SignatureGroup};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name under which the Vue presence signature is reported.
const VUE_SIGNATURE: &str = "vue";

#[derive(Debug, Clone, Default)]
/// Meta-framework sub-catalog: feature flags and installed modules.
pub struct NuxtCatalog {
    pub meta: SignatureGroup,
    pub modules: SignatureGroup,
}

#[derive(Debug, Clone)]
/// Every signature group, compiled.
pub struct Catalog {
    source: Option<PathBuf>,
    vue: Signature,
    frameworks: SignatureGroup,
    uis: SignatureGroup,
    plugins: SignatureGroup,
    nuxt: NuxtCatalog,
}

impl Catalog {
    /// Load and validate a catalog directory.
    ///
    /// All six group files must be present; see [`GroupKind::file_name`].
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("catalog directory {} does not exist", dir.display());
        }
        let schemas = SignatureSchemas::for_catalog_dir(dir)?;

        let vue_path = dir.join(GroupKind::Vue.file_name());
        let vue_value = read_json(&vue_path)?;
        let vue = compile_definition(&schemas, vue_value)
            .with_context(|| format!("loading {}", vue_path.display()))?;

        let load_group = |kind: GroupKind| -> Result<SignatureGroup> {
            let path = dir.join(kind.file_name());
            let value = read_json(&path)?;
            compile_group(&schemas, kind, value)
                .with_context(|| format!("loading {}", path.display()))
        };

        let catalog = Self {
            source: Some(dir.to_path_buf()),
            vue,
            frameworks: load_group(GroupKind::Frameworks)?,
            uis: load_group(GroupKind::Uis)?,
            plugins: load_group(GroupKind::Plugins)?,
            nuxt: NuxtCatalog {
                meta: load_group(GroupKind::NuxtMeta)?,
                modules: load_group(GroupKind::NuxtModules)?,
            },
        };
        catalog.log_summary();
        Ok(catalog)
    }

    /// Build a catalog from one JSON document shaped like the directory:
    /// `{"vue": {..}, "frameworks": {..}, "uis": {..}, "plugins": {..},
    /// "nuxt": {"meta": {..}, "modules": {..}}}`.
    ///
    /// Absent groups are empty and an absent `vue` entry never matches.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut document) = value else {
            bail!("catalog document must be a JSON object");
        };
        let schemas = SignatureSchemas::bundled()?;

        let vue = match document.remove("vue") {
            Some(raw) => compile_definition(&schemas, raw).context("catalog entry 'vue'")?,
            None => Signature::compile(
                SignatureName(VUE_SIGNATURE.to_string()),
                &SignatureDefinition::default(),
            )?,
        };

        let mut nuxt = match document.remove("nuxt") {
            Some(Value::Object(nuxt)) => nuxt,
            Some(_) => bail!("catalog entry 'nuxt' must be an object"),
            None => Default::default(),
        };
        let take = |kind: GroupKind, raw: Option<Value>| -> Result<SignatureGroup> {
            match raw {
                Some(raw) => compile_group(&schemas, kind, raw)
                    .with_context(|| format!("catalog group '{kind}'")),
                None => Ok(SignatureGroup::default()),
            }
        };
        let frameworks = take(GroupKind::Frameworks, document.remove("frameworks"))?;
        let uis = take(GroupKind::Uis, document.remove("uis"))?;
        let plugins = take(GroupKind::Plugins, document.remove("plugins"))?;
        let meta = take(GroupKind::NuxtMeta, nuxt.remove("meta"))?;
        let modules = take(GroupKind::NuxtModules, nuxt.remove("modules"))?;

        if let Some(extra) = document.keys().chain(nuxt.keys()).next() {
            bail!("unknown catalog entry '{extra}'");
        }

        Ok(Self {
            source: None,
            vue,
            frameworks,
            uis,
            plugins,
            nuxt: NuxtCatalog { meta, modules },
        })
    }

    /// Directory the catalog was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn vue(&self) -> &Signature {
        &self.vue
    }

    pub fn frameworks(&self) -> &SignatureGroup {
        &self.frameworks
    }

    pub fn uis(&self) -> &SignatureGroup {
        &self.uis
    }

    pub fn plugins(&self) -> &SignatureGroup {
        &self.plugins
    }

    pub fn nuxt(&self) -> &NuxtCatalog {
        &self.nuxt
    }

    /// The name-keyed group for `kind`; `None` for the single Vue signature.
    pub fn group(&self, kind: GroupKind) -> Option<&SignatureGroup> {
        match kind {
            GroupKind::Vue => None,
            GroupKind::Frameworks => Some(&self.frameworks),
            GroupKind::Uis => Some(&self.uis),
            GroupKind::Plugins => Some(&self.plugins),
            GroupKind::NuxtMeta => Some(&self.nuxt.meta),
            GroupKind::NuxtModules => Some(&self.nuxt.modules),
        }
    }

    /// Number of signatures per group, in [`GroupKind::ALL`] order.
    pub fn counts(&self) -> Vec<(GroupKind, usize)> {
        GroupKind::ALL
            .into_iter()
            .map(|kind| {
                let count = self.group(kind).map_or(1, SignatureGroup::len);
                (kind, count)
            })
            .collect()
    }

    /// Signatures that declare no rule and therefore can never match.
    pub fn vacuous_signatures(&self) -> Vec<(GroupKind, &SignatureName)> {
        let mut found = Vec::new();
        if self.vue.is_vacuous() {
            found.push((GroupKind::Vue, self.vue.name()));
        }
        for kind in GroupKind::ALL {
            if let Some(group) = self.group(kind) {
                found.extend(
                    group
                        .iter()
                        .filter(|signature| signature.is_vacuous())
                        .map(|signature| (kind, signature.name())),
                );
            }
        }
        found
    }

    fn log_summary(&self) {
        info!(
            catalog = %self.source.as_deref().map(|dir| dir.display().to_string()).unwrap_or_default(),
            frameworks = self.frameworks.len(),
            uis = self.uis.len(),
            plugins = self.plugins.len(),
            nuxt_meta = self.nuxt.meta.len(),
            nuxt_modules = self.nuxt.modules.len(),
            "loaded signature catalog"
        );
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn compile_definition(schemas: &SignatureSchemas, value: Value) -> Result<Signature> {
    validate(&schemas.definition, &value, "signature definition")?;
    let definition: SignatureDefinition = serde_json::from_value(value)?;
    Signature::compile(SignatureName(VUE_SIGNATURE.to_string()), &definition)
}

fn compile_group(schemas: &SignatureSchemas, kind: GroupKind, value: Value) -> Result<SignatureGroup> {
    validate(&schemas.group, &value, &format!("signature group '{kind}'"))?;
    let definitions = parse_group(value)?;
    SignatureGroup::compile(&definitions)
}
