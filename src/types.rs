//! Schema and message tree type definitions.
//!
//! This module defines the two trees the merge engine walks in lockstep:
//! [`SchemaNode`], a JSON-Schema-style type description, and [`MessageNode`],
//! a parallel tree of validation message templates shaped like a subset of
//! the schema. Both parse from (and, for schemas, serialize back to)
//! [`serde_json::Value`], so they round-trip through JSON untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reserved message-tree key for the singular "value is invalid" template.
pub(crate) const INVALID_MESSAGE_KEY: &str = "invalidMessage";

/// Reserved message-tree key for the singular "value is required" template.
pub(crate) const REQUIRED_MESSAGE_KEY: &str = "requiredMessage";

/// Schema attribute holding the per-keyword message map.
pub(crate) const MESSAGES_KEY: &str = "messages";

/// Errors raised while parsing a schema or message tree from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A schema node was not a JSON object.
    #[error("schema node must be a JSON object, got {0}")]
    SchemaNotObject(&'static str),
    /// The root of a message tree was not a JSON object.
    #[error("message tree root must be a JSON object, got {0}")]
    MessageNotObject(&'static str),
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Structural children of a schema node, determined by its `type` tag.
///
/// An `object` schema carries named child schemas under `properties`; an
/// `array` schema carries a single shared element schema under `items`;
/// everything else is a leaf as far as the merge engine is concerned.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaShape {
    /// Named child schemas of an `object` node, in authored order.
    Object(IndexMap<String, SchemaNode>),
    /// The element schema shared by every index of an `array` node.
    Array(Box<SchemaNode>),
    /// No structural children.
    #[default]
    Leaf,
}

/// A node in a JSON-Schema-style type tree.
///
/// The structural children (`properties`/`items`) are lifted into a typed
/// shape; every keyword — `type`, `description`, constraint values like
/// `minLength`, authored `messages` — is kept in an opaque, order-preserving
/// attribute map. Attributes double as the interpolation context for
/// `${name}` placeholders in message templates.
///
/// # Examples
///
/// ```
/// use schema_messages::SchemaNode;
/// use serde_json::json;
///
/// let schema = SchemaNode::from_value(&json!({
///     "type": "object",
///     "properties": {
///         "tags": {"type": "array", "minItems": 1, "items": {"type": "string"}}
///     }
/// })).unwrap();
///
/// let tags = schema.property("tags").unwrap();
/// assert_eq!(tags.node_type(), Some("array"));
/// assert_eq!(tags.attr("minItems"), Some(&json!(1)));
/// assert_eq!(tags.items().unwrap().node_type(), Some("string"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct SchemaNode {
    pub(crate) ty: Option<String>,
    pub(crate) shape: SchemaShape,
    pub(crate) attrs: Map<String, Value>,
}

impl SchemaNode {
    /// Parses a schema node from a JSON value.
    ///
    /// `properties` is lifted into the node's shape only when `type` is
    /// `"object"`, and `items` only when `type` is `"array"`; in any other
    /// combination those keys stay in the attribute map untouched, exactly
    /// as authored.
    pub fn from_value(value: &Value) -> Result<Self, TreeError> {
        let Some(map) = value.as_object() else {
            return Err(TreeError::SchemaNotObject(json_type_name(value)));
        };

        let ty = map.get("type").and_then(Value::as_str).map(str::to_owned);
        let mut shape = SchemaShape::Leaf;
        let mut attrs = Map::new();

        for (key, value) in map {
            match key.as_str() {
                "properties" if ty.as_deref() == Some("object") && value.is_object() => {
                    let children = value
                        .as_object()
                        .into_iter()
                        .flatten()
                        .map(|(name, child)| Ok((name.clone(), SchemaNode::from_value(child)?)))
                        .collect::<Result<IndexMap<_, _>, TreeError>>()?;
                    shape = SchemaShape::Object(children);
                }
                "items" if ty.as_deref() == Some("array") && value.is_object() => {
                    shape = SchemaShape::Array(Box::new(SchemaNode::from_value(value)?));
                }
                _ => {
                    attrs.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(Self { ty, shape, attrs })
    }

    /// Serializes this node back to a JSON value.
    pub fn to_value(&self) -> Value {
        let mut map = self.attrs.clone();
        match &self.shape {
            SchemaShape::Object(properties) => {
                let children = properties
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_value()))
                    .collect();
                map.insert("properties".to_string(), Value::Object(children));
            }
            SchemaShape::Array(items) => {
                map.insert("items".to_string(), items.to_value());
            }
            SchemaShape::Leaf => {}
        }
        Value::Object(map)
    }

    /// The node's `type` tag, when authored as a string.
    pub fn node_type(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// The node's structural children.
    pub fn shape(&self) -> &SchemaShape {
        &self.shape
    }

    /// Looks up a named child schema of an `object` node.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        match &self.shape {
            SchemaShape::Object(properties) => properties.get(name),
            _ => None,
        }
    }

    /// The shared element schema of an `array` node.
    pub fn items(&self) -> Option<&SchemaNode> {
        match &self.shape {
            SchemaShape::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up an attribute by name, `type` included.
    ///
    /// This is the lookup used to fill `${name}` template placeholders.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// All non-structural attributes, `type` included, in authored order.
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }
}

impl TryFrom<Value> for SchemaNode {
    type Error = TreeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<SchemaNode> for Value {
    fn from(node: SchemaNode) -> Self {
        node.to_value()
    }
}

/// A node in a message-template tree, shaped like a subset of the schema.
///
/// Entries are classified once, at parse time:
///
/// - the reserved keys `invalidMessage` and `requiredMessage` become singular
///   directives;
/// - any other string-valued key is a per-failure-keyword template
///   (e.g. `"minLength": "..."`);
/// - any object-valued key is a nested message node for the child schema at
///   that name (`properties.<key>` of an object schema, or `items` of an
///   array schema);
/// - anything else is silently dropped.
///
/// # Examples
///
/// ```
/// use schema_messages::MessageNode;
/// use serde_json::json;
///
/// let message = MessageNode::from_value(&json!({
///     "invalidMessage": "bad ${description}",
///     "minItems": "need at least ${minItems}",
///     "items": {"maxLength": "too long"}
/// })).unwrap();
///
/// assert_eq!(message.invalid_message(), Some("bad ${description}"));
/// assert_eq!(message.keywords().get("minItems").map(String::as_str),
///            Some("need at least ${minItems}"));
/// assert!(message.children().contains_key("items"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct MessageNode {
    invalid_message: Option<String>,
    required_message: Option<String>,
    keywords: IndexMap<String, String>,
    children: IndexMap<String, MessageNode>,
}

impl MessageNode {
    /// An empty message node; merging it into a schema is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a message tree from a JSON value.
    ///
    /// The root must be a JSON object. Nested values that are neither
    /// strings nor objects are dropped without error.
    pub fn from_value(value: &Value) -> Result<Self, TreeError> {
        let Some(map) = value.as_object() else {
            return Err(TreeError::MessageNotObject(json_type_name(value)));
        };

        let mut node = Self::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                (INVALID_MESSAGE_KEY, Value::String(template)) => {
                    node.invalid_message = Some(template.clone());
                }
                (REQUIRED_MESSAGE_KEY, Value::String(template)) => {
                    node.required_message = Some(template.clone());
                }
                (_, Value::String(template)) => {
                    node.keywords.insert(key.clone(), template.clone());
                }
                (_, Value::Object(_)) => {
                    node.children.insert(key.clone(), Self::from_value(value)?);
                }
                _ => {}
            }
        }
        Ok(node)
    }

    /// The `invalidMessage` directive template, if authored.
    pub fn invalid_message(&self) -> Option<&str> {
        self.invalid_message.as_deref()
    }

    /// The `requiredMessage` directive template, if authored.
    pub fn required_message(&self) -> Option<&str> {
        self.required_message.as_deref()
    }

    /// Per-failure-keyword templates, in authored order.
    pub fn keywords(&self) -> &IndexMap<String, String> {
        &self.keywords
    }

    /// Nested message nodes, keyed by child schema name.
    pub fn children(&self) -> &IndexMap<String, MessageNode> {
        &self.children
    }

    /// True when the node carries no directives, templates, or children.
    pub fn is_empty(&self) -> bool {
        self.invalid_message.is_none()
            && self.required_message.is_none()
            && self.keywords.is_empty()
            && self.children.is_empty()
    }
}

impl TryFrom<Value> for MessageNode {
    type Error = TreeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
