//! Schema/message merging.
//!
//! [`build_patch`] walks a schema tree and its message tree in lockstep and
//! produces a [`SchemaPatch`] describing how the schema should change:
//! singular directives replace a key outright, per-keyword templates are
//! shallow-merged into the node's `messages` map, and nested patches follow
//! the schema's `properties`/`items` structure. [`merge_schema`] applies the
//! patch as a pure structural update, leaving the input schema untouched.
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
//!         "categoryId": {"type": "number", "description": "category"}
//!     }
//! })).unwrap();
//! let message = MessageNode::from_value(&json!({
//!     "categoryId": {"type": "Invalid ${description} type"}
//! })).unwrap();
//!
//! let merged = merge_schema(&schema, &message).unwrap();
//! let node = visit_schema(&merged, "categoryId").unwrap();
//! assert_eq!(
//!     node.attr("messages"),
//!     Some(&json!({"type": "Invalid category type"}))
//! );
//! ```

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::template::interpolate;
use crate::types::{
    INVALID_MESSAGE_KEY, MESSAGES_KEY, MessageNode, REQUIRED_MESSAGE_KEY, SchemaNode, SchemaShape,
};

/// Errors raised while merging a message tree into a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The message tree nests into a path the schema does not contain.
    #[error("message tree references schema path that does not exist: {path}")]
    SchemaMismatch {
        /// Dotted path of the missing schema node.
        path: String,
    },
}

/// A patch describing how a message tree transforms one schema node.
///
/// Intermediate output of [`build_patch`], consumed by [`merge_schema`].
/// Directives are replace-operations, `messages` is a shallow-merge into
/// any existing `messages` map, and the nested patches mirror the schema's
/// structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPatch {
    invalid_message: Option<String>,
    required_message: Option<String>,
    messages: IndexMap<String, String>,
    properties: IndexMap<String, SchemaPatch>,
    items: Option<Box<SchemaPatch>>,
}

impl SchemaPatch {
    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.invalid_message.is_none()
            && self.required_message.is_none()
            && self.messages.is_empty()
            && self.properties.is_empty()
            && self.items.is_none()
    }
}

/// Builds the patch a message node implies for its schema node.
///
/// Pure: neither input is mutated. Directive and per-keyword templates are
/// interpolated against the *current* schema node's attributes. Nested
/// message nodes dispatch by the schema node's type: object schemas recurse
/// per named property, array schemas recurse only into the child literally
/// named `items`, and schemas of any other type drop nested entries.
///
/// # Errors
///
/// Returns [`MergeError::SchemaMismatch`] when a nested message node names
/// a property (or `items`) the schema does not define.
pub fn build_patch(schema: &SchemaNode, message: &MessageNode) -> Result<SchemaPatch, MergeError> {
    build_at(schema, message, &mut Vec::new())
}

fn build_at(
    schema: &SchemaNode,
    message: &MessageNode,
    path: &mut Vec<String>,
) -> Result<SchemaPatch, MergeError> {
    let mut patch = SchemaPatch {
        invalid_message: message
            .invalid_message()
            .map(|template| interpolate(template, schema)),
        required_message: message
            .required_message()
            .map(|template| interpolate(template, schema)),
        ..SchemaPatch::default()
    };

    for (keyword, template) in message.keywords() {
        patch
            .messages
            .insert(keyword.clone(), interpolate(template, schema));
    }

    if message.children().is_empty() {
        return Ok(patch);
    }

    match schema.node_type() {
        Some("object") => {
            for (name, child_message) in message.children() {
                path.push(name.clone());
                let child_schema = schema.property(name).ok_or_else(|| mismatch(path))?;
                let child_patch = build_at(child_schema, child_message, path)?;
                patch.properties.insert(name.clone(), child_patch);
                path.pop();
            }
        }
        Some("array") => {
            // Only the reserved child named `items` is meaningful here.
            if let Some(child_message) = message.children().get("items") {
                path.push("items".to_string());
                let child_schema = schema.items().ok_or_else(|| mismatch(path))?;
                patch.items = Some(Box::new(build_at(child_schema, child_message, path)?));
                path.pop();
            }
        }
        // Primitive schemas cannot carry nested message overrides.
        _ => {}
    }

    Ok(patch)
}

fn mismatch(path: &[String]) -> MergeError {
    MergeError::SchemaMismatch {
        path: path.join("."),
    }
}

/// Merges a message tree into a schema, producing a new schema.
///
/// The input schema and all its descendants are left unmodified. Existing
/// `messages` entries on a node survive unless the message tree supplies
/// the same keyword.
///
/// # Errors
///
/// Returns [`MergeError::SchemaMismatch`] when the message tree's shape
/// does not mirror the schema's; the error surfaces before any validation
/// could run.
pub fn merge_schema(schema: &SchemaNode, message: &MessageNode) -> Result<SchemaNode, MergeError> {
    let patch = build_patch(schema, message)?;
    debug!(empty = patch.is_empty(), "applying message patch to schema");
    Ok(apply_patch(schema, &patch))
}

fn apply_patch(schema: &SchemaNode, patch: &SchemaPatch) -> SchemaNode {
    let mut merged = schema.clone();

    if let Some(text) = &patch.invalid_message {
        merged
            .attrs
            .insert(INVALID_MESSAGE_KEY.to_string(), Value::String(text.clone()));
    }
    if let Some(text) = &patch.required_message {
        merged
            .attrs
            .insert(REQUIRED_MESSAGE_KEY.to_string(), Value::String(text.clone()));
    }

    if !patch.messages.is_empty() {
        if let Some(Value::Object(existing)) = merged.attrs.get_mut(MESSAGES_KEY) {
            for (keyword, text) in &patch.messages {
                existing.insert(keyword.clone(), Value::String(text.clone()));
            }
        } else {
            let messages: Map<String, Value> = patch
                .messages
                .iter()
                .map(|(keyword, text)| (keyword.clone(), Value::String(text.clone())))
                .collect();
            merged
                .attrs
                .insert(MESSAGES_KEY.to_string(), Value::Object(messages));
        }
    }

    if !patch.properties.is_empty() {
        if let SchemaShape::Object(properties) = &mut merged.shape {
            for (name, child_patch) in &patch.properties {
                if let Some(child) = properties.get_mut(name) {
                    let updated = apply_patch(child, child_patch);
                    *child = updated;
                }
            }
        }
    }

    if let (Some(child_patch), SchemaShape::Array(items)) = (&patch.items, &mut merged.shape) {
        let updated = apply_patch(items, child_patch);
        **items = updated;
    }

    merged
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema(value: Value) -> SchemaNode {
        SchemaNode::from_value(&value).unwrap()
    }

    fn message(value: Value) -> MessageNode {
        MessageNode::from_value(&value).unwrap()
    }

    #[test]
    fn test_build_patch_interpolates_singular_directives() {
        let schema = schema(json!({"type": "string", "description": "name"}));
        let message = message(json!({
            "invalidMessage": "bad ${description}",
            "requiredMessage": "${description} is required"
        }));

        let patch = build_patch(&schema, &message).unwrap();
        assert_eq!(patch.invalid_message.as_deref(), Some("bad name"));
        assert_eq!(patch.required_message.as_deref(), Some("name is required"));
    }

    #[test]
    fn test_build_patch_collects_keyword_messages() {
        let schema = schema(json!({"type": "string", "minLength": 10}));
        let message = message(json!({"minLength": "at least ${minLength} characters"}));

        let patch = build_patch(&schema, &message).unwrap();
        assert_eq!(
            patch.messages.get("minLength").map(String::as_str),
            Some("at least 10 characters")
        );
    }

    #[test]
    fn test_build_patch_rejects_missing_property() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "object",
                    "properties": {"x": {"type": "number"}}
                }
            }
        }));
        let message = message(json!({"a": {"b": {"type": "nope"}}}));

        let err = build_patch(&schema, &message).unwrap_err();
        assert_eq!(
            err,
            MergeError::SchemaMismatch {
                path: "a.b".to_string()
            }
        );
    }

    #[test]
    fn test_build_patch_rejects_items_on_array_without_items() {
        let schema = schema(json!({"type": "array"}));
        let message = message(json!({"items": {"type": "nope"}}));

        let err = build_patch(&schema, &message).unwrap_err();
        assert_eq!(
            err,
            MergeError::SchemaMismatch {
                path: "items".to_string()
            }
        );
    }

    #[test]
    fn test_build_patch_drops_nested_on_primitive_schema() {
        let schema = schema(json!({"type": "number"}));
        let message = message(json!({"anything": {"type": "ignored"}}));

        let patch = build_patch(&schema, &message).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_build_patch_ignores_non_items_children_on_array() {
        let schema = schema(json!({"type": "array", "items": {"type": "string"}}));
        let message = message(json!({"other": {"type": "ignored"}}));

        let patch = build_patch(&schema, &message).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_merge_schema_does_not_mutate_input() {
        let schema = schema(json!({
            "type": "object",
            "properties": {"id": {"type": "number", "description": "id"}}
        }));
        let before = schema.clone();
        let message = message(json!({"id": {"type": "bad ${description}"}}));

        let merged = merge_schema(&schema, &message).unwrap();
        assert_eq!(schema, before);
        assert_ne!(merged, before);
    }

    #[test]
    fn test_merge_schema_with_empty_message_is_identity() {
        let schema = schema(json!({
            "type": "object",
            "properties": {"id": {"type": "number"}}
        }));

        let merged = merge_schema(&schema, &MessageNode::new()).unwrap();
        assert_eq!(merged, schema);
    }

    #[test]
    fn test_merge_schema_merges_into_existing_messages() {
        let schema = schema(json!({
            "type": "number",
            "messages": {"minimum": "old"}
        }));
        let message = message(json!({"maximum": "new"}));

        let merged = merge_schema(&schema, &message).unwrap();
        assert_eq!(
            merged.attr("messages"),
            Some(&json!({"minimum": "old", "maximum": "new"}))
        );
    }

    #[test]
    fn test_merge_schema_sets_directives_on_node() {
        let schema = schema(json!({"type": "string", "description": "name"}));
        let message = message(json!({"invalidMessage": "bad ${description}"}));

        let merged = merge_schema(&schema, &message).unwrap();
        assert_eq!(merged.attr("invalidMessage"), Some(&json!("bad name")));
    }

    #[test]
    fn test_merge_schema_recurses_through_array_items() {
        let schema = schema(json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string", "description": "tag", "maxLength": 30}
                }
            }
        }));
        let message = message(json!({
            "tags": {
                "items": {"maxLength": "${description} is capped at ${maxLength}"}
            }
        }));

        let merged = merge_schema(&schema, &message).unwrap();
        let items = merged.property("tags").unwrap().items().unwrap();
        assert_eq!(
            items.attr("messages"),
            Some(&json!({"maxLength": "tag is capped at 30"}))
        );
    }
}
