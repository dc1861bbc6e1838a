//! # Object Matcher
//!
//! Decides whether a live object in an object store already reflects the
//! state a client wants it to have.
//!
//! The decision is made by computing a three-way patch between the last
//! applied configuration (recorded in an annotation), the desired object and
//! the live object. An empty patch means nothing needs to be written. Typed
//! objects are diffed with a strategic merge driven by per-field merge
//! metadata; free-form objects use JSON merge patch semantics.
//!
//! ## Modules
//!
//! - [`json`] - Null stripping and path removal on JSON documents
//! - [`annotation`] - Recording and reading the last applied configuration
//! - [`patch`] - The three-way patch engine
//! - [`matcher`] - Match decision on top of the patch engine
//! - [`merge`] - Strategic and JSON merge patch computation
//! - [`schema`] - Merge metadata schema and the [`PatchMeta`] cursor
//! - [`catalog`] - Lookup of merge metadata by object type
//! - [`object`] - The [`Object`] trait and [`Unstructured`] documents
//! - [`resources`] - Built-in typed kinds
//! - [`client`] - Object store access used by reconciliation harnesses
//! - [`fieldpath`] - Paths into documents

pub mod annotation;
pub mod catalog;
pub mod client;
pub mod error;
pub mod fieldpath;
pub mod json;
pub mod matcher;
pub mod merge;
pub mod object;
pub mod patch;
pub mod resources;
pub mod schema;

pub use annotation::{Annotator, LAST_APPLIED_CONFIG};
pub use catalog::{MergeMetadataSource, SchemaCatalog};
pub use error::{Error, Result};
pub use fieldpath::{Path, PathElement};
pub use json::delete_null_in_json;
pub use matcher::{Matcher, MatcherBuilder};
pub use merge::{JsonMergePatch, MergeError, StrategicMerge};
pub use object::{Object, ObjectMeta, Representation, TypeMeta, Unstructured};
pub use patch::{CalculateOption, PatchMaker, PatchMakerBuilder, PatchResult};
pub use schema::{PatchMeta, Schema};
