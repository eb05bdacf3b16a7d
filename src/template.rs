//! `${name}` placeholder interpolation against a schema node.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::SchemaNode;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("static regex must compile"));

/// Fills `${name}` placeholders in `template` from `node`'s attributes.
///
/// Any attribute of the schema node can be referenced, including `type`
/// and constraint values like `minItems`. Placeholders naming an attribute
/// the node does not have are left verbatim.
///
/// # Examples
///
/// ```
/// use schema_messages::{SchemaNode, interpolate};
/// use serde_json::json;
///
/// let node = SchemaNode::from_value(&json!({
///     "type": "array",
///     "description": "tags",
///     "minItems": 2
/// })).unwrap();
///
/// assert_eq!(
///     interpolate("need at least ${minItems} ${description}", &node),
///     "need at least 2 tags"
/// );
/// assert_eq!(interpolate("${nope}", &node), "${nope}");
/// ```
pub fn interpolate(template: &str, node: &SchemaNode) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match node.attr(&caps[1]) {
            Some(value) => render(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
