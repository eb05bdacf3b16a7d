//! Dotted-path navigation into a schema tree.

use crate::types::SchemaNode;

/// Resolves the schema node at a dot-delimited `path`, or `None`.
///
/// Each segment steps through `properties.<segment>` of an object node.
/// On an array node a segment is treated as an element index whenever it
/// parses as a non-negative integer, stepping into the shared `items`
/// schema; the numeric value itself is never used, so `tags.0` and
/// `tags.999` resolve to the same node. Any other combination resolves to
/// `None`.
///
/// # Examples
///
/// ```
/// use schema_messages::{SchemaNode, visit_schema};
/// use serde_json::json;
///
/// let schema = SchemaNode::from_value(&json!({
///     "type": "object",
///     "properties": {
///         "sales": {
///             "type": "array",
///             "items": {
///                 "type": "object",
///                 "properties": {"year": {"type": "number"}}
///             }
///         }
///     }
/// })).unwrap();
///
/// let year = visit_schema(&schema, "sales.0.year").unwrap();
/// assert_eq!(year.node_type(), Some("number"));
/// assert!(visit_schema(&schema, "sales.first.year").is_none());
/// ```
pub fn visit_schema<'a>(schema: &'a SchemaNode, path: &str) -> Option<&'a SchemaNode> {
    path.split('.').try_fold(schema, |node, segment| {
        match node.node_type() {
            Some("object") => node.property(segment),
            Some("array") if segment.parse::<usize>().is_ok() => node.items(),
            _ => None,
        }
    })
}
