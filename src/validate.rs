//! Validator construction and error enrichment.
//!
//! Validation itself is delegated to an external engine behind the
//! [`SchemaCompiler`] seam: the engine receives the (merged) schema plus
//! options and hands back a compiled validator whose single
//! [`validate`](CompiledSchema::validate) call returns validity and the raw
//! error list together. This module wires the merge step in front of
//! compilation and fills in missing error messages afterwards, resolving
//! each error's schema node against the caller's *original* schema and a
//! [`DefaultMessages`] registry of per-keyword generators.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::merge::{MergeError, merge_schema};
use crate::resolve::visit_schema;
use crate::types::{MessageNode, SchemaNode};

/// A single validation failure.
///
/// `path` is the dot-delimited address of the failing node (array indices
/// as numeric segments), `keyword` names the failed constraint, and
/// `message` stays absent when neither the schema's annotations nor a
/// default generator could supply one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted path from the input root to the failing value.
    pub path: String,
    /// Name of the failed constraint (e.g. `type`, `minLength`).
    pub keyword: String,
    /// Resolved human-readable message, when one could be found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationError {
    /// Creates an error without a message.
    pub fn new(path: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            keyword: keyword.into(),
            message: None,
        }
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome of validating one input value.
///
/// An invalid input is a normal result, never an error: `is_valid` is
/// `false` and `errors` lists every reported failure, message-bearing or
/// not, in the order the validation engine produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Whether the input satisfied the schema.
    pub is_valid: bool,
    /// Raw errors enriched with resolved messages where possible.
    pub errors: Vec<ValidationError>,
}

/// Options passed through to the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Collect every failure instead of stopping at the first.
    pub greedy: bool,
}

/// The external validation engine: compiles a schema into a reusable
/// validator.
pub trait SchemaCompiler {
    /// The compiled validator this engine produces.
    type Compiled: CompiledSchema;

    /// Compiles `schema` (already message-merged) under `options`.
    fn compile(&self, schema: &SchemaNode, options: ValidateOptions) -> Self::Compiled;
}

/// A compiled validator produced by a [`SchemaCompiler`].
pub trait CompiledSchema {
    /// Validates one input, returning validity and the raw error list in a
    /// single call.
    ///
    /// Raw errors may already carry a message when the engine's own
    /// schema-annotation handling applied; those messages are passed
    /// through untouched by enrichment.
    fn validate(&self, input: &Value) -> (bool, Vec<ValidationError>);
}

type MessageGenerator = Arc<dyn Fn(&SchemaNode) -> String + Send + Sync>;

/// Registry of fallback message generators, keyed by failure keyword.
///
/// Each generator receives the failing node of the caller's original,
/// unmerged schema. One registry can back any number of validators.
///
/// # Examples
///
/// ```
/// use schema_messages::DefaultMessages;
///
/// let defaults = DefaultMessages::new().with("type", |node| {
///     format!(
///         "{} should be of type {}",
///         node.attr("description").and_then(|v| v.as_str()).unwrap_or("value"),
///         node.node_type().unwrap_or("unknown"),
///     )
/// });
/// assert!(!defaults.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct DefaultMessages {
    generators: HashMap<String, MessageGenerator>,
}

impl DefaultMessages {
    /// An empty registry: messages come only from schema annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a generator for a failure keyword, replacing any previous one.
    pub fn with(
        mut self,
        keyword: impl Into<String>,
        generate: impl Fn(&SchemaNode) -> String + Send + Sync + 'static,
    ) -> Self {
        self.generators.insert(keyword.into(), Arc::new(generate));
        self
    }

    /// True when no generators are registered.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    fn get(&self, keyword: &str) -> Option<&MessageGenerator> {
        self.generators.get(keyword)
    }
}

impl fmt::Debug for DefaultMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMessages")
            .field("keywords", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Captures a [`DefaultMessages`] registry for building validators.
///
/// Obtained from [`with_default_messages`].
#[derive(Debug, Clone)]
pub struct ValidatorFactory {
    defaults: DefaultMessages,
}

/// Creates a validator factory backed by `defaults`.
///
/// The factory is pure configuration capture; each
/// [`validator`](ValidatorFactory::validator) call merges, compiles, and
/// produces an independent, reusable [`Validator`].
pub fn with_default_messages(defaults: DefaultMessages) -> ValidatorFactory {
    ValidatorFactory { defaults }
}

impl ValidatorFactory {
    /// Builds a validator for `schema`, optionally merged with `message`.
    ///
    /// When `message` is given, the schema handed to the engine is
    /// `merge_schema(schema, message)`; enrichment nevertheless resolves
    /// error paths against the original `schema`, since default-message
    /// generators expect the caller's authored shape.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::SchemaMismatch`] when the message tree does
    /// not mirror the schema.
    pub fn validator<C: SchemaCompiler>(
        &self,
        compiler: &C,
        schema: &SchemaNode,
        message: Option<&MessageNode>,
        options: ValidateOptions,
    ) -> Result<Validator<C::Compiled>, MergeError> {
        let validation_schema = match message {
            Some(message) => merge_schema(schema, message)?,
            None => schema.clone(),
        };
        let compiled = compiler.compile(&validation_schema, options);

        Ok(Validator {
            compiled,
            schema: schema.clone(),
            defaults: self.defaults.clone(),
        })
    }
}

/// Builds a validator with no default-message generators.
///
/// Equivalent to `with_default_messages(DefaultMessages::new())`: error
/// messages come only from the schema's own `message`/`messages`
/// annotations, none are synthesized.
///
/// # Errors
///
/// Returns [`MergeError::SchemaMismatch`] when the message tree does not
/// mirror the schema.
pub fn validator<C: SchemaCompiler>(
    compiler: &C,
    schema: &SchemaNode,
    message: Option<&MessageNode>,
    options: ValidateOptions,
) -> Result<Validator<C::Compiled>, MergeError> {
    with_default_messages(DefaultMessages::new()).validator(compiler, schema, message, options)
}

/// A ready-to-use validator: compiled engine plus message enrichment.
///
/// Safe to call any number of times and from multiple threads at once
/// (given the engine's compiled validator is); every call allocates fresh
/// output and nothing captured is ever mutated.
pub struct Validator<V> {
    compiled: V,
    schema: SchemaNode,
    defaults: DefaultMessages,
}

impl<V> fmt::Debug for Validator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl<V: CompiledSchema> Validator<V> {
    /// Validates `input`, enriching each raw error with a resolved message.
    ///
    /// An error already carrying a non-empty message passes through
    /// unchanged. Otherwise the failing node is resolved in the original
    /// schema and the registered generator for the error's keyword is
    /// applied; when either is missing the error keeps no message. Order
    /// and length of the error list are preserved.
    pub fn validate(&self, input: &Value) -> Validation {
        let (is_valid, raw_errors) = self.compiled.validate(input);
        let errors: Vec<ValidationError> = raw_errors
            .into_iter()
            .map(|error| self.fill_message(error))
            .collect();
        debug!(is_valid, error_count = errors.len(), "validated input");

        Validation { is_valid, errors }
    }

    fn fill_message(&self, error: ValidationError) -> ValidationError {
        if error.message.as_deref().is_some_and(|m| !m.is_empty()) {
            return error;
        }

        let node = visit_schema(&self.schema, &error.path);
        let generate = self.defaults.get(&error.keyword);
        if let (Some(node), Some(generate)) = (node, generate) {
            return ValidationError {
                message: Some(generate(node)),
                ..error
            };
        }

        error
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // Engine stub returning a canned error list regardless of input.
    struct FixedErrors(Vec<ValidationError>);

    impl SchemaCompiler for FixedErrors {
        type Compiled = Fixed;

        fn compile(&self, _schema: &SchemaNode, _options: ValidateOptions) -> Fixed {
            Fixed(self.0.clone())
        }
    }

    struct Fixed(Vec<ValidationError>);

    impl CompiledSchema for Fixed {
        fn validate(&self, _input: &Value) -> (bool, Vec<ValidationError>) {
            (self.0.is_empty(), self.0.clone())
        }
    }

    fn schema() -> SchemaNode {
        SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "id": {"type": "number", "description": "id"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_existing_message_passes_through() {
        let compiler = FixedErrors(vec![
            ValidationError::new("id", "type").with_message("already resolved"),
        ]);
        let defaults = DefaultMessages::new().with("type", |_| "generated".to_string());

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), None, ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message.as_deref(), Some("already resolved"));
    }

    #[test]
    fn test_default_generator_fills_missing_message() {
        let compiler = FixedErrors(vec![ValidationError::new("id", "type")]);
        let defaults = DefaultMessages::new().with("type", |node| {
            format!(
                "{} should be of type {}",
                node.attr("description").and_then(|v| v.as_str()).unwrap_or(""),
                node.node_type().unwrap_or(""),
            )
        });

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), None, ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert_eq!(
            result.errors,
            vec![ValidationError::new("id", "type").with_message("id should be of type number")]
        );
    }

    #[test]
    fn test_empty_message_is_treated_as_missing() {
        let compiler = FixedErrors(vec![ValidationError::new("id", "type").with_message("")]);
        let defaults = DefaultMessages::new().with("type", |_| "generated".to_string());

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), None, ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert_eq!(result.errors[0].message.as_deref(), Some("generated"));
    }

    #[test]
    fn test_unknown_keyword_leaves_message_absent() {
        let compiler = FixedErrors(vec![ValidationError::new("id", "minimum")]);
        let defaults = DefaultMessages::new().with("type", |_| "generated".to_string());

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), None, ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert_eq!(result.errors, vec![ValidationError::new("id", "minimum")]);
    }

    #[test]
    fn test_unresolvable_path_leaves_message_absent() {
        let compiler = FixedErrors(vec![ValidationError::new("ghost", "type")]);
        let defaults = DefaultMessages::new().with("type", |_| "generated".to_string());

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), None, ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert!(result.errors[0].message.is_none());
    }

    #[test]
    fn test_generators_see_the_original_schema() {
        // The message tree adds an annotation; the generator must not see it.
        let compiler = FixedErrors(vec![ValidationError::new("id", "type")]);
        let defaults = DefaultMessages::new().with("type", |node| {
            assert!(node.attr("invalidMessage").is_none());
            "from original".to_string()
        });
        let message =
            MessageNode::from_value(&json!({"id": {"invalidMessage": "bad"}})).unwrap();

        let validate = with_default_messages(defaults)
            .validator(&compiler, &schema(), Some(&message), ValidateOptions::default())
            .unwrap();
        let result = validate.validate(&json!({}));

        assert_eq!(result.errors[0].message.as_deref(), Some("from original"));
    }

    #[test]
    fn test_mismatched_message_tree_fails_before_validation() {
        let compiler = FixedErrors(vec![]);
        let message = MessageNode::from_value(&json!({"ghost": {"type": "bad"}})).unwrap();

        let err = validator(&compiler, &schema(), Some(&message), ValidateOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::SchemaMismatch {
                path: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_valid_input_yields_empty_error_list() {
        let compiler = FixedErrors(vec![]);
        let validate = validator(&compiler, &schema(), None, ValidateOptions::default()).unwrap();
        let result = validate.validate(&json!({"id": 1}));

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }
}
