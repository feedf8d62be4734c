//! Classification strategies over the catalog groups.
//!
//! Two aggregation shapes live here:
//!
//! * exclusive categories (framework, UI library) scan their group
//!   sequentially in declaration order and stop at the first match, so the
//!   earlier entry wins when two would match;
//! * non-exclusive categories (plugins, Nuxt modules and feature flags) start
//!   every evaluation at once on the current task and merge by name, so the
//!   result does not depend on completion order.

use crate::catalog::{Catalog, SignatureName};
use crate::evidence::PageEvidence;
use crate::signature::SignatureGroup;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Framework entry whose presence enables the Nuxt sections of a report.
pub const NUXT_FRAMEWORK: &str = "nuxt";

/// Runs classification strategies against one immutable catalog.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'c> {
    catalog: &'c Catalog,
}

impl<'c> Classifier<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Whether the page runs Vue at all.
    pub async fn has_vue(&self, evidence: &PageEvidence<'_>) -> bool {
        self.catalog.vue().is_matching(evidence).await
    }

    /// The first declared framework that matches.
    pub async fn framework(&self, evidence: &PageEvidence<'_>) -> Option<&'c SignatureName> {
        let found = first_match(self.catalog.frameworks(), evidence).await;
        debug!(framework = ?found.map(SignatureName::as_str), "resolved framework");
        found
    }

    /// The first declared UI library that matches.
    pub async fn ui(&self, evidence: &PageEvidence<'_>) -> Option<&'c SignatureName> {
        let found = first_match(self.catalog.uis(), evidence).await;
        debug!(ui = ?found.map(SignatureName::as_str), "resolved ui library");
        found
    }

    /// Every plugin that matches.
    pub async fn plugins(&self, evidence: &PageEvidence<'_>) -> BTreeSet<SignatureName> {
        collect_matches(self.catalog.plugins(), evidence).await
    }

    /// Every Nuxt module that matches.
    pub async fn nuxt_modules(&self, evidence: &PageEvidence<'_>) -> BTreeSet<SignatureName> {
        collect_matches(&self.catalog.nuxt().modules, evidence).await
    }

    /// Every Nuxt feature flag with its outcome, matched or not.
    pub async fn nuxt_meta(&self, evidence: &PageEvidence<'_>) -> BTreeMap<SignatureName, bool> {
        map_matches(&self.catalog.nuxt().meta, evidence).await
    }

    /// Full technology report for one page.
    ///
    /// Nothing beyond `has_vue` is evaluated on a page without Vue, and the
    /// Nuxt sections are only filled when the framework resolved to
    /// [`NUXT_FRAMEWORK`].
    pub async fn analyze(&self, evidence: &PageEvidence<'_>) -> PageReport {
        if !self.has_vue(evidence).await {
            debug!("page does not run vue; skipping remaining groups");
            return PageReport::default();
        }

        let framework = self.framework(evidence).await.cloned();
        let ui = self.ui(evidence).await.cloned();
        let plugins = self.plugins(evidence).await;

        let (nuxt_meta, nuxt_modules) =
            if framework.as_ref().map(SignatureName::as_str) == Some(NUXT_FRAMEWORK) {
                let (meta, modules) =
                    futures::join!(self.nuxt_meta(evidence), self.nuxt_modules(evidence));
                (Some(meta), Some(modules))
            } else {
                (None, None)
            };

        PageReport {
            has_vue: true,
            framework,
            ui,
            plugins,
            nuxt_meta,
            nuxt_modules,
        }
    }
}

/// Aggregated classification of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub has_vue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<SignatureName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<SignatureName>,
    pub plugins: BTreeSet<SignatureName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuxt_meta: Option<BTreeMap<SignatureName, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuxt_modules: Option<BTreeSet<SignatureName>>,
}

async fn first_match<'g>(
    group: &'g SignatureGroup,
    evidence: &PageEvidence<'_>,
) -> Option<&'g SignatureName> {
    for signature in group.iter() {
        if signature.is_matching(evidence).await {
            return Some(signature.name());
        }
    }
    None
}

async fn collect_matches(
    group: &SignatureGroup,
    evidence: &PageEvidence<'_>,
) -> BTreeSet<SignatureName> {
    map_matches(group, evidence)
        .await
        .into_iter()
        .filter_map(|(name, matched)| matched.then_some(name))
        .collect()
}

async fn map_matches(
    group: &SignatureGroup,
    evidence: &PageEvidence<'_>,
) -> BTreeMap<SignatureName, bool> {
    let pending = group.iter().map(|signature| async move {
        let matched = signature.is_matching(evidence).await;
        (signature.name().clone(), matched)
    });
    join_all(pending).await.into_iter().collect()
}
