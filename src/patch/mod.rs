//! Patch module - the three-way patch engine.
//!
//! [`PatchMaker::calculate`] serializes the live (*current*) and desired
//! (*modified*) objects, reads the *original* configuration from the live
//! object's annotation, and hands the three documents to the merge algorithm
//! matching the object's representation.


use crate::annotation::Annotator;
use crate::catalog::{MergeMetadataSource, SchemaCatalog};
use crate::error::{Error, Result};
use crate::fieldpath::Path;
use crate::json::{delete_null_in_value, remove_path};
use crate::merge::{JsonMergePatch, JsonMergePatcher, StrategicMerge, StrategicMerger};
use crate::object::{Object, Representation};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const EMPTY_PATCH: &[u8] = b"{}";

/// PatchResult holds a computed patch and the three documents it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub patch: Vec<u8>,
    pub current: Vec<u8>,
    pub modified: Vec<u8>,
    pub original: Vec<u8>,
}

impl PatchResult {
    /// Returns true if applying the patch changes nothing.
    pub fn is_unmodified(&self) -> bool {
        self.patch == EMPTY_PATCH
    }
}

impl fmt::Display for PatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patch: {}", String::from_utf8_lossy(&self.patch))?;
        writeln!(f, "Current: {}", String::from_utf8_lossy(&self.current))?;
        writeln!(f, "Modified: {}", String::from_utf8_lossy(&self.modified))?;
        write!(f, "Original: {}", String::from_utf8_lossy(&self.original))
    }
}

/// CalculateOption removes fields from all three documents before they are
/// compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculateOption {
    /// Drops the top-level `status` field.
    IgnoreStatusFields,
    /// Drops the field at the given path.
    IgnoreField(Path),
}

impl CalculateOption {
    /// Ignores a field given as a dotted path, e.g. `metadata.resourceVersion`.
    pub fn ignore_field(dotted: &str) -> Self {
        CalculateOption::IgnoreField(Path::parse_dotted(dotted))
    }

    fn apply(&self, document: &mut Value) {
        match self {
            CalculateOption::IgnoreStatusFields => {
                remove_path(document, &Path::parse_dotted("status"));
            }
            CalculateOption::IgnoreField(path) => {
                remove_path(document, path);
            }
        }
    }
}

/// PatchMakerBuilder is a builder for creating a PatchMaker.
#[derive(Default)]
pub struct PatchMakerBuilder {
    annotator: Option<Annotator>,
    metadata_source: Option<Arc<dyn MergeMetadataSource>>,
    strategic_merge: Option<Arc<dyn StrategicMerge>>,
    json_merge_patch: Option<Arc<dyn JsonMergePatch>>,
}

impl PatchMakerBuilder {
    pub fn new() -> Self {
        PatchMakerBuilder::default()
    }

    /// Sets the annotator used to read original configurations.
    pub fn annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Sets the catalog of merge metadata for typed objects.
    pub fn metadata_source(mut self, source: Arc<dyn MergeMetadataSource>) -> Self {
        self.metadata_source = Some(source);
        self
    }

    pub fn strategic_merge(mut self, strategic: Arc<dyn StrategicMerge>) -> Self {
        self.strategic_merge = Some(strategic);
        self
    }

    pub fn json_merge_patch(mut self, json_merge: Arc<dyn JsonMergePatch>) -> Self {
        self.json_merge_patch = Some(json_merge);
        self
    }

    /// Builds the PatchMaker. Unset collaborators get their defaults.
    pub fn build(self) -> PatchMaker {
        PatchMaker {
            annotator: self.annotator.unwrap_or_default(),
            metadata_source: self
                .metadata_source
                .unwrap_or_else(|| SchemaCatalog::builtin() as Arc<dyn MergeMetadataSource>),
            strategic_merge: self
                .strategic_merge
                .unwrap_or_else(|| Arc::new(StrategicMerger)),
            json_merge_patch: self
                .json_merge_patch
                .unwrap_or_else(|| Arc::new(JsonMergePatcher)),
        }
    }
}

/// PatchMaker computes three-way patches between live and desired objects.
#[derive(Clone)]
pub struct PatchMaker {
    annotator: Annotator,
    metadata_source: Arc<dyn MergeMetadataSource>,
    strategic_merge: Arc<dyn StrategicMerge>,
    json_merge_patch: Arc<dyn JsonMergePatch>,
}

impl Default for PatchMaker {
    fn default() -> Self {
        PatchMaker::builder().build()
    }
}

impl fmt::Debug for PatchMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchMaker")
            .field("annotator", &self.annotator)
            .finish_non_exhaustive()
    }
}

impl PatchMaker {
    pub fn builder() -> PatchMakerBuilder {
        PatchMakerBuilder::new()
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Calculates the patch that turns `current` into `modified`.
    ///
    /// Fields present on the live object that were never part of a desired
    /// state are kept. Fields that were applied before and are gone from
    /// `modified` are deleted. Where `modified` sets a field, its value wins.
    pub fn calculate<C, M>(&self, current: &C, modified: &M, opts: &[CalculateOption]) -> Result<PatchResult>
    where
        C: Object,
        M: Object,
    {
        let object = current.object_ref();
        let modified_object = modified.object_ref();

        let mut current_doc = serde_json::to_value(current)
            .map_err(|e| Error::serialization("serialize current object", &object, e))?;
        let mut modified_doc = serde_json::to_value(modified)
            .map_err(|e| Error::serialization("serialize modified object", &modified_object, e))?;
        delete_null_in_value(&mut modified_doc);

        for opt in opts {
            opt.apply(&mut current_doc);
            opt.apply(&mut modified_doc);
        }

        let current_bytes = serde_json::to_vec(&current_doc)
            .map_err(|e| Error::serialization("serialize current object", &object, e))?;
        let modified_bytes = serde_json::to_vec(&modified_doc)
            .map_err(|e| Error::serialization("serialize modified object", &modified_object, e))?;

        let mut original = self.annotator.get_original_configuration(current)?;
        if !opts.is_empty() {
            let mut original_doc: Value =
                serde_json::from_slice(&original).map_err(|e| Error::decode(&object, e.to_string()))?;
            for opt in opts {
                opt.apply(&mut original_doc);
            }
            original = serde_json::to_vec(&original_doc)
                .map_err(|e| Error::serialization("serialize original configuration", &object, e))?;
        }

        let patch = match current.representation() {
            Representation::Typed => {
                let meta = modified.merge_metadata(self.metadata_source.as_ref())?;
                self.strategic_merge
                    .create_three_way_merge_patch(&original, &modified_bytes, &current_bytes, &meta, true)
                    .map_err(|e| Error::merge("create three-way strategic merge patch", &object, e))?
            }
            Representation::Unstructured => self
                .json_merge_patch
                .create_three_way_json_merge_patch(&original, &modified_bytes, &current_bytes)
                .map_err(|e| Error::merge("create three-way json merge patch", &object, e))?,
        };

        debug!(
            object = %object,
            patch = %String::from_utf8_lossy(&patch),
            "calculated patch"
        );

        Ok(PatchResult {
            patch,
            current: current_bytes,
            modified: modified_bytes,
            original,
        })
    }
}
