use crate::probe::PageEvaluator;

/// Everything the engine may look at for one page.
///
/// Borrowed for the duration of a classification call. The runtime is
/// mandatory: catalogs routinely declare expression rules, so a bundle
/// without one cannot be constructed.
#[derive(Clone, Copy)]
pub struct PageEvidence<'a> {
    pub markup: &'a str,
    pub script_uris: &'a [String],
    pub runtime: &'a dyn PageEvaluator,
}

impl<'a> PageEvidence<'a> {
    pub fn new(
        markup: &'a str,
        script_uris: &'a [String],
        runtime: &'a dyn PageEvaluator,
    ) -> Self {
        Self {
            markup,
            script_uris,
            runtime,
        }
    }
}

impl std::fmt::Debug for PageEvidence<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageEvidence")
            .field("markup_len", &self.markup.len())
            .field("script_uris", &self.script_uris)
            .finish_non_exhaustive()
    }
}
