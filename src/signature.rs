//! Compiled signatures and the per-page match predicate.

use crate::catalog::identity::SignatureName;
use crate::catalog::model::{DefinitionList, SignatureDefinition};
use crate::evidence::PageEvidence;
use crate::pattern::PatternSet;
use crate::probe::probe_any;
use anyhow::{Context, Result};
use tracing::trace;

/// A catalog entry with its patterns compiled.
#[derive(Debug, Clone)]
pub struct Signature {
    name: SignatureName,
    html: PatternSet,
    script: PatternSet,
    js: Vec<String>,
}

impl Signature {
    /// Compile a definition. Pattern errors are reported with the signature name.
    pub fn compile(name: SignatureName, definition: &SignatureDefinition) -> Result<Self> {
        let html = PatternSet::compile(definition.html.as_slice())
            .with_context(|| format!("signature '{name}': html rule"))?;
        let script = PatternSet::compile(definition.script.as_slice())
            .with_context(|| format!("signature '{name}': script rule"))?;
        Ok(Self {
            name,
            html,
            script,
            js: definition.js.0.clone(),
        })
    }

    pub fn name(&self) -> &SignatureName {
        &self.name
    }

    pub fn html(&self) -> &PatternSet {
        &self.html
    }

    pub fn script(&self) -> &PatternSet {
        &self.script
    }

    pub fn expressions(&self) -> &[String] {
        &self.js
    }

    /// True when no channel carries a rule; such a signature never matches.
    pub fn is_vacuous(&self) -> bool {
        self.html.is_empty() && self.script.is_empty() && self.js.is_empty()
    }

    /// Decide whether this signature is present on the page.
    ///
    /// Channels are checked cheapest first (markup, script URIs, runtime) and
    /// the first positive channel ends the evaluation, so the runtime is only
    /// consulted when neither synchronous channel matched.
    pub async fn is_matching(&self, evidence: &PageEvidence<'_>) -> bool {
        if self.html.matches_text(evidence.markup) {
            trace!(signature = %self.name, channel = "html", "signature matched");
            return true;
        }
        if self.script.matches_any(evidence.script_uris) {
            trace!(signature = %self.name, channel = "script", "signature matched");
            return true;
        }
        if probe_any(evidence.runtime, self.js.as_slice()).await {
            trace!(signature = %self.name, channel = "js", "signature matched");
            return true;
        }
        false
    }
}

/// Signatures of one category, in catalog declaration order.
///
/// Declaration order is the priority order for first-match resolution.
#[derive(Debug, Clone, Default)]
pub struct SignatureGroup {
    signatures: Vec<Signature>,
}

impl SignatureGroup {
    pub fn compile(definitions: &DefinitionList) -> Result<Self> {
        let signatures = definitions
            .iter()
            .map(|(name, definition)| Signature::compile(name.clone(), definition))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { signatures })
    }

    pub fn from_signatures(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures
            .iter()
            .find(|signature| signature.name.as_str() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &SignatureName> {
        self.signatures.iter().map(Signature::name)
    }
}
