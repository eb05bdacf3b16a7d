//! Schema/message merging and validation error enrichment.
//!
//! This crate pairs a JSON-Schema-style type tree with a separately
//! authored "message" tree supplying human-readable validation error text:
//!
//! - [`SchemaNode`] — a schema tree node (`object` with `properties`,
//!   `array` with `items`, or a leaf), plus opaque constraint attributes.
//! - [`MessageNode`] — a message tree node shaped like a subset of the
//!   schema, carrying `${name}` templates per failure keyword and the
//!   reserved `invalidMessage`/`requiredMessage` directives.
//! - [`merge_schema`] — walks both trees in lockstep and produces a new
//!   schema with the interpolated messages attached; inputs are never
//!   mutated, and a message node that strays off the schema's shape fails
//!   fast with [`MergeError::SchemaMismatch`].
//! - [`visit_schema`] — dotted-path lookup into a schema, resolving every
//!   numeric segment on an array to its shared `items` node.
//! - [`with_default_messages`] / [`validator`] — build validators on top
//!   of an external validation engine (the [`SchemaCompiler`] seam) and
//!   enrich its raw errors with messages from the merged schema or from
//!   per-keyword [`DefaultMessages`] generators.
//!
//! Validation semantics themselves (type checks, bounds, formats) live in
//! the engine behind [`SchemaCompiler`]; this crate only prepares the
//! schema handed to it and post-processes the errors it reports.
//!
//! # Example
//!
//! ```
//! use schema_messages::{MessageNode, SchemaNode, merge_schema, visit_schema};
//! use serde_json::json;
//!
//! let schema = SchemaNode::from_value(&json!({
//!     "type": "object",
//!     "properties": {
//!         "tags": {
//!             "type": "array",
//!             "description": "tags",
//!             "minItems": 1,
//!             "items": {"type": "string", "description": "tag", "maxLength": 30}
//!         }
//!     }
//! })).unwrap();
//!
//! let message = MessageNode::from_value(&json!({
//!     "tags": {
//!         "minItems": "There should be no less than ${minItems} ${description}",
//!         "items": {"maxLength": "Each ${description} is capped at ${maxLength}"}
//!     }
//! })).unwrap();
//!
//! let merged = merge_schema(&schema, &message).unwrap();
//! assert_eq!(
//!     visit_schema(&merged, "tags").unwrap().attr("messages"),
//!     Some(&json!({"minItems": "There should be no less than 1 tags"}))
//! );
//! assert_eq!(
//!     visit_schema(&merged, "tags.0").unwrap().attr("messages"),
//!     Some(&json!({"maxLength": "Each tag is capped at 30"}))
//! );
//! ```

mod merge;
mod resolve;
mod template;
mod types;
mod validate;

pub use merge::{MergeError, SchemaPatch, build_patch, merge_schema};
pub use resolve::visit_schema;
pub use template::interpolate;
pub use types::{MessageNode, SchemaNode, SchemaShape, TreeError};
pub use validate::{
    CompiledSchema, DefaultMessages, SchemaCompiler, ValidateOptions, Validation, ValidationError,
    Validator, ValidatorFactory, validator, with_default_messages,
};
