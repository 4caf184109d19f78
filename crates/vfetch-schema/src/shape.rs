//! # Shape Builders
//!
//! Small constructors for common JSON Schema documents, so call sites can
//! write `object().field("hello", string())` instead of spelling out the
//! schema JSON. Every builder returns a plain [`Value`]; compile it with
//! [`crate::JsonSchema::new`] or use [`ObjectShape::compile`].

use serde_json::{json, Map, Value};

use crate::error::SchemaError;
use crate::json::JsonSchema;

pub fn string() -> Value {
    json!({ "type": "string" })
}

/// Any JSON number, integral or not.
pub fn number() -> Value {
    json!({ "type": "number" })
}

pub fn integer() -> Value {
    json!({ "type": "integer" })
}

pub fn boolean() -> Value {
    json!({ "type": "boolean" })
}

pub fn null() -> Value {
    json!({ "type": "null" })
}

/// Array whose every element matches `item`.
pub fn array(item: impl Into<Value>) -> Value {
    json!({ "type": "array", "items": item.into() })
}

/// `shape` or `null`.
pub fn nullable(shape: impl Into<Value>) -> Value {
    let null_shape = null();
    json!({ "anyOf": [shape.into(), null_shape] })
}

/// Exactly `value`.
pub fn literal(value: impl Into<Value>) -> Value {
    json!({ "const": value.into() })
}

/// One of `values`.
pub fn enumeration<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    json!({ "enum": values })
}

/// Start an object shape.
pub fn object() -> ObjectShape {
    ObjectShape::default()
}

/// Builder for `{"type": "object"}` schemas.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    properties: Map<String, Value>,
    required: Vec<String>,
    strict: bool,
}

impl ObjectShape {
    /// Required property.
    pub fn field(mut self, name: impl Into<String>, shape: impl Into<Value>) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), shape.into());
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Property that may be absent.
    pub fn optional(mut self, name: impl Into<String>, shape: impl Into<Value>) -> Self {
        let name = name.into();
        self.required.retain(|r| r != &name);
        self.properties.insert(name, shape.into());
        self
    }

    /// Reject keys not declared with `field` or `optional`.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn build(self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(self.properties));
        if !self.required.is_empty() {
            schema.insert("required".into(), json!(self.required));
        }
        if self.strict {
            schema.insert("additionalProperties".into(), json!(false));
        }
        Value::Object(schema)
    }

    /// Build and compile into an untyped [`JsonSchema`].
    pub fn compile(self) -> Result<JsonSchema, SchemaError> {
        JsonSchema::new(self.build())
    }
}

impl From<ObjectShape> for Value {
    fn from(shape: ObjectShape) -> Self {
        shape.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssueKind;

    #[test]
    fn object_builds_expected_document() {
        let doc = object()
            .field("hello", string())
            .optional("count", integer())
            .strict()
            .build();
        assert_eq!(
            doc,
            json!({
                "type": "object",
                "properties": {
                    "hello": { "type": "string" },
                    "count": { "type": "integer" }
                },
                "required": ["hello"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn optional_overrides_earlier_field() {
        let doc = object().field("a", string()).optional("a", string()).build();
        assert!(doc.get("required").is_none());
    }

    #[test]
    fn nested_shapes_validate() {
        let schema = object()
            .field("user", object().field("name", string()).field("age", integer()))
            .field("tags", array(string()))
            .field("status", enumeration(["active", "disabled"]))
            .optional("note", nullable(string()))
            .compile()
            .unwrap();

        let ok = json!({
            "user": { "name": "ada", "age": 36 },
            "tags": ["x"],
            "status": "active",
            "note": null
        });
        assert!(schema.check(&ok).is_ok());

        let bad = json!({
            "user": { "name": "ada", "age": "36" },
            "tags": [],
            "status": "gone"
        });
        let failure = schema.check(&bad).unwrap_err();
        assert_eq!(failure.issues_at("/user/age").next().unwrap().kind, IssueKind::Type);
        assert_eq!(failure.issues_at("/status").next().unwrap().kind, IssueKind::Enum);
    }

    #[test]
    fn array_and_nullable_accept_object_shapes() {
        let item = || object().field("id", integer());
        let schema = object()
            .field("items", array(item()))
            .field("owner", nullable(item()))
            .compile()
            .unwrap();

        assert!(schema.is_valid(&json!({ "items": [{ "id": 1 }], "owner": null })));
        assert!(schema.is_valid(&json!({ "items": [], "owner": { "id": 2 } })));

        let failure = schema
            .check(&json!({ "items": [{ "id": "x" }], "owner": null }))
            .unwrap_err();
        let issue = failure.issues_at("/items/0/id").next().unwrap();
        assert_eq!(issue.kind, IssueKind::Type);
        assert_eq!(issue.expected, json!("integer"));
    }

    #[test]
    fn nullable_document_lists_both_alternatives() {
        assert_eq!(
            nullable(string()),
            json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] })
        );
    }

    #[test]
    fn literal_and_scalars() {
        let schema = JsonSchema::new(object().field("v", literal(3)).field("b", boolean())).unwrap();
        assert!(schema.is_valid(&json!({ "v": 3, "b": true })));
        assert!(!schema.is_valid(&json!({ "v": 4, "b": true })));
        assert!(JsonSchema::new(null()).unwrap().is_valid(&Value::Null));
        assert!(JsonSchema::new(number()).unwrap().is_valid(&json!(1.5)));
    }
}
