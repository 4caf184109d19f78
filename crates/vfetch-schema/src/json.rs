//! # Compiled JSON Schema
//!
//! [`JsonSchema`] wraps a `jsonschema` validator compiled once from a
//! schema document. Validation collects every violation, not just the first,
//! and converts each into an [`Issue`]. On success the value is deserialized
//! into the schema's output type `T` (the raw `serde_json::Value` by
//! default, in which case it is returned unchanged).
//!
//! Remote `$ref`s are never fetched. Standalone schemas resolve only their
//! own internal references; cross-document references go through
//! [`crate::SchemaRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{ValidationError, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaError;
use crate::issue::{Issue, IssueKind, IssueOrigin, ValidationFailure};
use crate::registry::LocalSchemaRetriever;
use crate::Schema;

const ANONYMOUS: &str = "<anonymous>";

/// A compiled JSON Schema whose successful output is `T`.
pub struct JsonSchema<T = Value> {
    name: Option<String>,
    document: Value,
    validator: Validator,
    _output: PhantomData<fn() -> T>,
}

impl JsonSchema {
    /// Compile an untyped schema. Successful validation yields the input
    /// value unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Build`] if `document` is not a valid schema.
    pub fn new(document: impl Into<Value>) -> Result<Self, SchemaError> {
        Self::typed(document)
    }
}

impl<T> JsonSchema<T> {
    /// Compile a schema whose successful output is deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Build`] if `document` is not a valid schema.
    pub fn typed(document: impl Into<Value>) -> Result<Self, SchemaError> {
        let document = document.into();
        let retriever = LocalSchemaRetriever::new(HashMap::new());
        let validator = compile(&document, None, retriever)?;
        Ok(Self::from_parts(None, document, validator))
    }

    pub(crate) fn from_parts(name: Option<String>, document: Value, validator: Validator) -> Self {
        Self {
            name,
            document,
            validator,
            _output: PhantomData,
        }
    }

    /// Attach a display name, reported in [`ValidationFailure::schema_name`].
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reuse the compiled validator with a different output type.
    pub fn into_typed<U>(self) -> JsonSchema<U> {
        JsonSchema::from_parts(self.name, self.document, self.validator)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The schema document this validator was compiled from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Fast boolean check without collecting issues.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Structural check only: every violation of the schema, without
    /// deserializing into `T`.
    pub fn check(&self, instance: &Value) -> Result<(), ValidationFailure> {
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(instance)
            .map(|e| issue_from_error(&self.document, &e))
            .collect();

        match ValidationFailure::new(self.name.clone(), issues) {
            None => Ok(()),
            Some(failure) => Err(failure),
        }
    }
}

impl<T: DeserializeOwned> JsonSchema<T> {
    /// Synchronous form of [`Schema::validate`].
    pub fn parse(&self, value: Value) -> Result<T, ValidationFailure> {
        self.check(&value)?;
        match T::deserialize(&value) {
            Ok(out) => Ok(out),
            Err(e) => Err(ValidationFailure::single(
                self.name.clone(),
                deserialize_issue::<T>(value, &e),
            )),
        }
    }
}

impl<T> Schema for JsonSchema<T>
where
    T: DeserializeOwned + Send,
{
    type Output = T;

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validate(&self, value: Value) -> impl Future<Output = Result<T, ValidationFailure>> + Send {
        std::future::ready(self.parse(value))
    }
}

impl<T> fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("name", &self.name)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Compile `document` with local-only `$ref` resolution. Documents without
/// a `$schema` declaration are treated as Draft 2020-12.
pub(crate) fn compile(
    document: &Value,
    name: Option<&str>,
    retriever: LocalSchemaRetriever,
) -> Result<Validator, SchemaError> {
    let mut opts = jsonschema::options();
    if document.get("$schema").is_none() {
        opts.with_draft(jsonschema::Draft::Draft202012);
    }
    opts.with_retriever(retriever);

    opts.build(document).map_err(|e| SchemaError::Build {
        schema_name: name.unwrap_or(ANONYMOUS).to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn issue_from_error(document: &Value, error: &ValidationError<'_>) -> Issue {
    let schema_path = error.schema_path.to_string();
    let (kind, expected, origin) = classify(&error.kind).unwrap_or_else(|| {
        let keyword = schema_path.rsplit('/').next().unwrap_or_default();
        (
            IssueKind::from_keyword(keyword),
            document.pointer(&schema_path).cloned().unwrap_or(Value::Null),
            IssueOrigin::for_keyword(keyword),
        )
    });

    Issue {
        kind,
        expected,
        input: error.instance.clone().into_owned(),
        instance_path: error.instance_path.to_string(),
        origin,
        message: error.to_string(),
        schema_path,
    }
}

/// Kind, expected constraint and origin read from the validator's error.
/// `None` for errors that carry no constraint; those are located through
/// the schema path instead.
fn classify(error_kind: &ValidationErrorKind) -> Option<(IssueKind, Value, IssueOrigin)> {
    use ValidationErrorKind as K;

    let on_value = |kind: IssueKind, expected: Value| Some((kind, expected, IssueOrigin::Value));
    match error_kind {
        K::Type { kind } => on_value(IssueKind::Type, type_names(kind)),
        K::Required { property } => on_value(IssueKind::Required, property.clone()),
        K::Enum { options } => on_value(IssueKind::Enum, options.clone()),
        K::Constant { expected_value } => on_value(IssueKind::Const, expected_value.clone()),
        K::Format { format } => on_value(IssueKind::Format, Value::String(format.clone())),
        K::Pattern { pattern } => on_value(IssueKind::Pattern, Value::String(pattern.clone())),
        K::Minimum { limit }
        | K::Maximum { limit }
        | K::ExclusiveMinimum { limit }
        | K::ExclusiveMaximum { limit } => on_value(IssueKind::Range, limit.clone()),
        K::MultipleOf { multiple_of } => on_value(IssueKind::Range, Value::from(*multiple_of)),
        K::MinLength { limit }
        | K::MaxLength { limit }
        | K::MinItems { limit }
        | K::MaxItems { limit }
        | K::MinProperties { limit }
        | K::MaxProperties { limit } => on_value(IssueKind::Length, Value::from(*limit)),
        K::AdditionalProperties { .. } => Some((
            IssueKind::AdditionalProperties,
            Value::Bool(false),
            IssueOrigin::Key,
        )),
        K::FalseSchema => on_value(IssueKind::Forbidden, Value::Bool(false)),
        _ => None,
    }
}

fn type_names(kind: &TypeKind) -> Value {
    match kind {
        TypeKind::Single(ty) => Value::String(ty.to_string()),
        TypeKind::Multiple(types) => (*types)
            .into_iter()
            .map(|ty| Value::String(ty.to_string()))
            .collect(),
    }
}

/// Issue for a value that could not be deserialized into `T`. `expected`
/// carries the Rust type name.
pub(crate) fn deserialize_issue<T>(input: Value, error: &serde_json::Error) -> Issue {
    Issue {
        kind: IssueKind::Deserialize,
        expected: Value::String(std::any::type_name::<T>().to_string()),
        input,
        instance_path: String::new(),
        schema_path: String::new(),
        origin: IssueOrigin::Value,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    fn greeting(kind: &str) -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": { "hello": { "type": kind } },
            "required": ["hello"]
        }))
        .unwrap()
    }

    #[test]
    fn conforming_value_is_returned_unchanged() {
        let value = json!({ "hello": "world", "extra": [1, 2, 3] });
        let out = greeting("string").parse(value.clone()).unwrap();
        assert_eq!(out, value);
    }

    #[test]
    fn type_mismatch_identifies_field_and_expected_type() {
        let failure = greeting("number")
            .parse(json!({ "hello": "world" }))
            .unwrap_err();
        assert_eq!(failure.len(), 1);
        let issue = &failure.issues()[0];
        assert_eq!(issue.kind, IssueKind::Type);
        assert_eq!(issue.expected, json!("number"));
        assert_eq!(issue.input, json!("world"));
        assert_eq!(issue.instance_path, "/hello");
        assert_eq!(issue.schema_path, "/properties/hello/type");
        assert_eq!(issue.origin, IssueOrigin::Value);
        assert_eq!(issue.field().as_deref(), Some("hello"));
    }

    #[test]
    fn every_violation_is_reported() {
        let schema = JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "minimum": 1 },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["id", "name"],
            "additionalProperties": false
        }))
        .unwrap()
        .named("record");

        let failure = schema
            .check(&json!({ "id": 0, "tags": ["a", 2], "unknown": true }))
            .unwrap_err();

        assert_eq!(failure.schema_name(), Some("record"));
        let kinds: Vec<&IssueKind> = failure.issues().iter().map(|i| &i.kind).collect();
        assert!(kinds.contains(&&IssueKind::Range));
        assert!(kinds.contains(&&IssueKind::Required));
        assert!(kinds.contains(&&IssueKind::AdditionalProperties));
        assert_eq!(failure.issues_at("/tags/1").count(), 1);

        let required = failure
            .issues()
            .iter()
            .find(|i| i.kind == IssueKind::Required)
            .unwrap();
        assert_eq!(required.expected, json!("name"));
        assert_eq!(required.instance_path, "");

        let extra = failure
            .issues()
            .iter()
            .find(|i| i.kind == IssueKind::AdditionalProperties)
            .unwrap();
        assert_eq!(extra.origin, IssueOrigin::Key);
    }

    #[test]
    fn expected_is_reported_through_local_ref() {
        let schema = JsonSchema::new(json!({
            "$defs": { "word": { "type": "string", "minLength": 3 } },
            "properties": {
                "hello": { "$ref": "#/$defs/word" },
                "bye": { "$ref": "#/$defs/word" }
            }
        }))
        .unwrap();

        let failure = schema.check(&json!({ "hello": 1, "bye": "x" })).unwrap_err();

        let hello = failure.issues_at("/hello").next().unwrap();
        assert_eq!(hello.kind, IssueKind::Type);
        assert_eq!(hello.expected, json!("string"));
        assert_eq!(hello.schema_path, "/properties/hello/$ref/type");

        let bye = failure.issues_at("/bye").next().unwrap();
        assert_eq!(bye.kind, IssueKind::Length);
        assert_eq!(bye.expected, json!(3));
    }

    #[test]
    fn false_subschema_is_forbidden_not_a_property_name() {
        let schema = JsonSchema::new(json!({ "properties": { "x": false } })).unwrap();
        let failure = schema.check(&json!({ "x": 1 })).unwrap_err();
        let issue = &failure.issues()[0];
        assert_eq!(issue.kind, IssueKind::Forbidden);
        assert_eq!(issue.expected, json!(false));
        assert_eq!(issue.instance_path, "/x");
    }

    #[test]
    fn multiple_types_and_bounds_carry_their_constraint() {
        let schema = JsonSchema::new(json!({
            "properties": {
                "id": { "type": ["integer", "null"] },
                "score": { "maximum": 10 }
            }
        }))
        .unwrap();
        let failure = schema.check(&json!({ "id": "a", "score": 11 })).unwrap_err();

        let id = failure.issues_at("/id").next().unwrap();
        assert_eq!(id.kind, IssueKind::Type);
        let expected: Vec<&str> = id
            .expected
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(expected.contains(&"integer") && expected.contains(&"null"));

        let score = failure.issues_at("/score").next().unwrap();
        assert_eq!(score.kind, IssueKind::Range);
        assert_eq!(score.expected, json!(10));
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let err = JsonSchema::new(json!({ "type": "not-a-type" })).unwrap_err();
        assert!(matches!(err, SchemaError::Build { .. }));
    }

    #[test]
    fn typed_output_is_deserialized() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Greeting {
            hello: String,
        }

        let schema = greeting("string").into_typed::<Greeting>();
        let out = schema.parse(json!({ "hello": "world" })).unwrap();
        assert_eq!(
            out,
            Greeting {
                hello: "world".into()
            }
        );
    }

    #[test]
    fn deserialize_failure_after_structural_pass_is_an_issue() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            count: u8,
        }

        // The schema accepts any object; the output type does not.
        let schema = JsonSchema::<Strict>::typed(json!({ "type": "object" })).unwrap();
        let failure = schema.parse(json!({ "count": 1000 })).unwrap_err();
        assert_eq!(failure.len(), 1);
        assert_eq!(failure.issues()[0].kind, IssueKind::Deserialize);
        assert_eq!(failure.issues()[0].input, json!({ "count": 1000 }));
    }

    #[tokio::test]
    async fn schema_trait_validate_matches_parse() {
        let schema = greeting("string");
        let out = schema.validate(json!({ "hello": "there" })).await.unwrap();
        assert_eq!(out, json!({ "hello": "there" }));
        assert!(schema.validate(json!({})).await.is_err());
    }

    proptest! {
        /// Any object carrying a string `hello` conforms and passes through as-is.
        #[test]
        fn conforming_objects_pass_through(
            hello in ".{0,16}",
            extra in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6),
        ) {
            let mut map: serde_json::Map<String, Value> =
                extra.into_iter().map(|(k, v)| (k, json!(v))).collect();
            map.insert("hello".into(), json!(hello));
            let value = Value::Object(map);
            let out = greeting("string").parse(value.clone()).unwrap();
            prop_assert_eq!(out, value);
        }

        /// A non-string `hello` is always reported at `/hello`.
        #[test]
        fn nonconforming_field_is_located(n in any::<i64>()) {
            let failure = greeting("string").parse(json!({ "hello": n })).unwrap_err();
            prop_assert_eq!(failure.issues_at("/hello").count(), 1);
        }
    }
}
