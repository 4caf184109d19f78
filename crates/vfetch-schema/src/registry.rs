//! # Schema Registry
//!
//! Holds named JSON Schema documents so that one schema can `$ref` another
//! and so response schemas can live as files next to the code that fetches
//! them.
//!
//! ## Schema Resolution
//!
//! Each document is registered under its name, under
//! `urn:vfetch:schema:<name>`, and under its own `$id` if it declares one.
//! A `$ref` such as `"user.schema.json"` or `"urn:vfetch:schema:user.schema.json"`
//! resolves to the registered document. Lookups fall back to the last path
//! segment of the reference URI, so relative references work regardless of
//! the base URI the validator assigned. Nothing is fetched over the network;
//! an unknown reference fails compilation.

use std::collections::HashMap;
use std::path::Path;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use crate::error::SchemaError;
use crate::json::{compile, JsonSchema};

/// URI prefix under which every registered schema is addressable.
pub const SCHEMA_URI_PREFIX: &str = "urn:vfetch:schema:";

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// Retriever that resolves `$ref` URIs from an in-memory map.
pub(crate) struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl LocalSchemaRetriever {
    pub(crate) fn new(schemas_by_uri: HashMap<String, Value>) -> Self {
        Self { schemas_by_uri }
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit(['/', ':']).next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("unresolved schema reference '{uri_str}' (remote references are not fetched)").into())
    }
}

/// Named schema documents with local cross-references.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.schema.json`, `*.schema.yaml` and `*.schema.yml` file in
    /// `dir` (not recursive). Files are registered under their file name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the directory cannot be read or a
    /// file does not parse.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::Load {
            path: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !SCHEMA_SUFFIXES.iter().any(|s| name.ends_with(s)) {
                continue;
            }

            let content = std::fs::read_to_string(&path)?;
            let value: Value = if name.ends_with(".schema.json") {
                serde_json::from_str(&content).map_err(|e| SchemaError::Load {
                    path: path.display().to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?
            } else {
                serde_yaml::from_str(&content).map_err(|e| SchemaError::Load {
                    path: path.display().to_string(),
                    reason: format!("invalid YAML: {e}"),
                })?
            };
            registry.insert(name, value);
        }

        tracing::debug!(dir = %dir.display(), count = registry.len(), "loaded schemas");
        Ok(registry)
    }

    /// Register `document` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, document: impl Into<Value>) -> &mut Self {
        self.schemas.insert(name.into(), document.into());
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered names, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Compile the schema registered as `name`, with every other registered
    /// schema available to `$ref`. The result is named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] for an unknown name and
    /// [`SchemaError::Build`] if the schema or a reference is invalid.
    pub fn compile<T>(&self, name: &str) -> Result<JsonSchema<T>, SchemaError> {
        let document = self
            .schemas
            .get(name)
            .ok_or_else(|| SchemaError::NotFound {
                schema_name: name.to_string(),
            })?
            .clone();

        let validator = compile(&document, Some(name), self.retriever())?;
        Ok(JsonSchema::from_parts(Some(name.to_string()), document, validator))
    }

    fn retriever(&self) -> LocalSchemaRetriever {
        let mut schemas_by_uri = HashMap::new();
        for (name, value) in &self.schemas {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{name}"), value.clone());
            if let Some(id) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(name.clone(), value.clone());
        }
        LocalSchemaRetriever::new(schemas_by_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssueKind;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .insert(
                "user.schema.json",
                json!({
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"]
                }),
            )
            .insert(
                "team.schema.json",
                json!({
                    "type": "object",
                    "properties": {
                        "lead": { "$ref": "user.schema.json" },
                        "members": {
                            "type": "array",
                            "items": { "$ref": "urn:vfetch:schema:user.schema.json" }
                        }
                    },
                    "required": ["lead"]
                }),
            );
        registry
    }

    #[test]
    fn cross_schema_refs_resolve_locally() {
        let team = registry().compile::<Value>("team.schema.json").unwrap();
        assert_eq!(team.name(), Some("team.schema.json"));

        let ok = json!({ "lead": { "name": "ada" }, "members": [{ "name": "bob" }] });
        assert!(team.check(&ok).is_ok());

        let failure = team
            .check(&json!({ "lead": { "name": 1 }, "members": [{}] }))
            .unwrap_err();
        assert_eq!(failure.schema_name(), Some("team.schema.json"));
        let lead = failure.issues_at("/lead/name").next().unwrap();
        assert_eq!(lead.kind, IssueKind::Type);
        assert_eq!(lead.expected, json!("string"));
        let member = failure.issues_at("/members/0").next().unwrap();
        assert_eq!(member.kind, IssueKind::Required);
        assert_eq!(member.expected, json!("name"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let err = registry().compile::<Value>("missing.schema.json").unwrap_err();
        assert!(matches!(err, SchemaError::NotFound { .. }));
    }

    #[test]
    fn unresolved_reference_fails_to_build() {
        let mut registry = SchemaRegistry::new();
        registry.insert(
            "dangling.schema.json",
            json!({ "$ref": "https://example.com/elsewhere.schema.json" }),
        );
        let err = registry.compile::<Value>("dangling.schema.json").unwrap_err();
        assert!(matches!(err, SchemaError::Build { .. }));
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(registry().names(), vec!["team.schema.json", "user.schema.json"]);
    }
}
