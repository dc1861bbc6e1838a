//! Matcher module - decides whether a live object already reflects its
//! desired state.


use crate::error::Result;
use crate::fieldpath::{Path, PathElement};
use crate::object::Object;
use crate::patch::{CalculateOption, PatchMaker, PatchResult};
use tracing::debug;

/// Metadata fields the server rewrites on every write.
pub const VOLATILE_FIELDS: &[&str] = &[
    "metadata.resourceVersion",
    "metadata.uid",
    "metadata.generation",
    "metadata.creationTimestamp",
    "metadata.managedFields",
    "metadata.selfLink",
];

/// MatcherBuilder is a builder for creating a Matcher.
#[derive(Debug, Default)]
pub struct MatcherBuilder {
    patch_maker: Option<PatchMaker>,
    options: Vec<CalculateOption>,
}

impl MatcherBuilder {
    pub fn new() -> Self {
        MatcherBuilder::default()
    }

    /// Sets the patch engine.
    pub fn patch_maker(mut self, patch_maker: PatchMaker) -> Self {
        self.patch_maker = Some(patch_maker);
        self
    }

    /// Adds an option applied on top of the volatile fields.
    pub fn option(mut self, option: CalculateOption) -> Self {
        self.options.push(option);
        self
    }

    /// Builds the Matcher. The volatile fields and the original-configuration
    /// annotation are always ignored.
    pub fn build(self) -> Matcher {
        let patch_maker = self.patch_maker.unwrap_or_default();

        let mut options: Vec<CalculateOption> = VOLATILE_FIELDS
            .iter()
            .copied()
            .map(CalculateOption::ignore_field)
            .collect();
        options.push(CalculateOption::IgnoreField(Path::from_elements(vec![
            PathElement::field_name("metadata"),
            PathElement::field_name("annotations"),
            PathElement::field_name(patch_maker.annotator().key()),
        ])));
        options.extend(self.options);

        Matcher { patch_maker, options }
    }
}

/// Matcher compares live objects with desired objects.
#[derive(Debug, Clone)]
pub struct Matcher {
    patch_maker: PatchMaker,
    options: Vec<CalculateOption>,
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::builder().build()
    }
}

impl Matcher {
    pub fn builder() -> MatcherBuilder {
        MatcherBuilder::new()
    }

    /// Creates a matcher over the given patch engine.
    pub fn new(patch_maker: PatchMaker) -> Self {
        Matcher::builder().patch_maker(patch_maker).build()
    }

    /// Returns true if applying `desired` to `existing` would change nothing.
    ///
    /// An error never means "no change needed".
    pub fn matches<E, D>(&self, existing: &E, desired: &D) -> Result<bool>
    where
        E: Object,
        D: Object,
    {
        let result = self.calculate(existing, desired)?;
        if result.is_unmodified() {
            return Ok(true);
        }
        debug!(
            object = %existing.object_ref(),
            patch = %String::from_utf8_lossy(&result.patch),
            "objects differ"
        );
        Ok(false)
    }

    /// Calculates the patch between `existing` and `desired` with the
    /// matcher's ignored fields.
    pub fn calculate<E, D>(&self, existing: &E, desired: &D) -> Result<PatchResult>
    where
        E: Object,
        D: Object,
    {
        self.patch_maker.calculate(existing, desired, &self.options)
    }
}
