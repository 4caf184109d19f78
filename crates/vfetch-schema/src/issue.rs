//! # Validation Issues
//!
//! Structured description of why a value failed a schema. A
//! [`ValidationFailure`] is never empty: it holds one [`Issue`] per
//! violation, each naming the failing keyword, the constraint that was
//! expected, the offending input, and where it sits in the instance.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Category of a validation issue, derived from the schema keyword that
/// rejected the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "keyword")]
pub enum IssueKind {
    /// `type` mismatch.
    Type,
    /// A `required` property is missing.
    Required,
    /// Value is not one of the `enum` members.
    Enum,
    /// Value differs from `const`.
    Const,
    /// String does not match `format`.
    Format,
    /// String does not match `pattern`.
    Pattern,
    /// Numeric bound: `minimum`, `maximum`, `exclusiveMinimum`,
    /// `exclusiveMaximum`, `multipleOf`.
    Range,
    /// Size bound on strings, arrays or objects.
    Length,
    /// Key not allowed by `additionalProperties`.
    AdditionalProperties,
    /// Value present where the schema is `false`.
    Forbidden,
    /// Value passed the structural check but could not be deserialized
    /// into the schema's output type.
    Deserialize,
    /// Any other keyword.
    Other(String),
}

impl IssueKind {
    /// Map a JSON Schema keyword to its issue category.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "type" => Self::Type,
            "required" => Self::Required,
            "enum" => Self::Enum,
            "const" => Self::Const,
            "format" => Self::Format,
            "pattern" => Self::Pattern,
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" => {
                Self::Range
            }
            "minLength" | "maxLength" | "minItems" | "maxItems" | "minProperties"
            | "maxProperties" => Self::Length,
            "additionalProperties" => Self::AdditionalProperties,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => f.write_str("type"),
            Self::Required => f.write_str("required"),
            Self::Enum => f.write_str("enum"),
            Self::Const => f.write_str("const"),
            Self::Format => f.write_str("format"),
            Self::Pattern => f.write_str("pattern"),
            Self::Range => f.write_str("range"),
            Self::Length => f.write_str("length"),
            Self::AdditionalProperties => f.write_str("additional_properties"),
            Self::Forbidden => f.write_str("forbidden"),
            Self::Deserialize => f.write_str("deserialize"),
            Self::Other(keyword) => f.write_str(keyword),
        }
    }
}

/// Whether an issue concerns an object key or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueOrigin {
    Value,
    Key,
}

impl IssueOrigin {
    pub(crate) fn for_keyword(keyword: &str) -> Self {
        match keyword {
            "additionalProperties" | "propertyNames" => Self::Key,
            _ => Self::Value,
        }
    }
}

/// A single validation issue with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Failure category.
    pub kind: IssueKind,
    /// The schema constraint that was not met: the type name(s) for a type
    /// check, the missing property for `required`, the bound for range and
    /// length checks. `Null` when the constraint cannot be located.
    pub expected: Value,
    /// The offending part of the input.
    pub input: Value,
    /// JSON Pointer to the offending value in the instance. Empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the schema.
    pub schema_path: String,
    pub origin: IssueOrigin,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Segments of [`Issue::instance_path`], unescaped.
    pub fn path_segments(&self) -> Vec<String> {
        self.instance_path
            .split('/')
            .skip(1)
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect()
    }

    /// Last path segment, i.e. the field or index the issue is about.
    /// `None` for issues at the root.
    pub fn field(&self) -> Option<String> {
        self.path_segments().pop()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root) [{}]: {}", self.kind, self.message)
        } else {
            write!(f, "  {} [{}]: {}", self.instance_path, self.kind, self.message)
        }
    }
}

/// Every issue found when a value failed a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    schema: Option<String>,
    issues: Vec<Issue>,
}

impl ValidationFailure {
    /// Build a failure from a non-empty issue list. Returns `None` when
    /// `issues` is empty, since an empty failure would mean success.
    pub fn new(schema: Option<String>, issues: Vec<Issue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self { schema, issues })
        }
    }

    pub(crate) fn single(schema: Option<String>, issue: Issue) -> Self {
        Self {
            schema,
            issues: vec![issue],
        }
    }

    /// Name of the schema the value was checked against, if it has one.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// A failure is never empty, so this is always `false`.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues whose instance path is exactly `instance_path`.
    pub fn issues_at<'a>(&'a self, instance_path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.instance_path == instance_path)
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(name) => writeln!(f, "validation failed against schema '{name}':")?,
            None => writeln!(f, "validation failed:")?,
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}
