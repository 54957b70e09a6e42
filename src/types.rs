//! Core types for flattened API descriptions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// HTTP verbs that carry operations in a path item.
pub const HTTP_VERBS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

/// Returns the JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Build the canonical key of an operation: `"{verb} {path}"` with every
/// path parameter segment (`{name}`) replaced by `{}`.
pub fn endpoint_key(verb: &str, path: &str) -> String {
    let mut templated = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        templated.push_str(&rest[..open]);
        templated.push_str("{}");
        rest = &rest[open + close + 1..];
    }
    templated.push_str(rest);
    format!("{} {}", verb, templated)
}

/// Wire location of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    Query,
    Path,
    Header,
    FormData,
    Body,
}

impl Location {
    /// Parse a parameter's `in` value.
    ///
    /// Returns `None` for locations Swagger 2.0 doesn't define.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(Location::Query),
            "path" => Some(Location::Path),
            "header" => Some(Location::Header),
            "formData" => Some(Location::FormData),
            "body" => Some(Location::Body),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Query => "query",
            Location::Path => "path",
            Location::Header => "header",
            Location::FormData => "formData",
            Location::Body => "body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a flattened field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    /// A single declared type name, e.g. `integer`.
    Named(String),
    /// A list of type names, e.g. `["string", "null"]`.
    Union(Vec<String>),
    /// Array leaf whose items are not expanded further.
    ArrayOf(Box<FieldType>),
    /// Open-ended object, rendered `Hash[string, T]`.
    Map(Box<FieldType>),
    /// Cycle break: the field refers back to one of its ancestors.
    Reference,
    /// No declared type.
    Any,
}

impl FieldType {
    /// Read the `type` keyword of a schema or parameter node.
    pub fn declared(node: &Value) -> Self {
        match node.get("type") {
            Some(Value::String(name)) => FieldType::Named(name.clone()),
            Some(Value::Array(names)) => FieldType::Union(
                names
                    .iter()
                    .map(|n| match n {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => FieldType::Any,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Named(name) => f.write_str(name),
            FieldType::Union(names) => {
                f.write_str("[")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\"", name)?;
                }
                f.write_str("]")
            }
            FieldType::ArrayOf(item) => write!(f, "{}[]", item),
            FieldType::Map(value) => write!(f, "Hash[string, {}]", value),
            FieldType::Reference => f.write_str("reference"),
            FieldType::Any => f.write_str("*"),
        }
    }
}

/// One flattened leaf field of a request or response.
///
/// Renders as `"{path} (in: {location}, type: {type})"`. Requiredness is
/// deliberately not part of a descriptor; see [`Flattened::required`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor {
    pub path: String,
    pub location: Location,
    pub ty: FieldType,
}

impl Descriptor {
    pub fn new(path: impl Into<String>, location: Location, ty: FieldType) -> Self {
        Self {
            path: path.into(),
            location,
            ty,
        }
    }

    /// True for the synthetic leaf emitted where a cycle was cut.
    pub fn is_reference(&self) -> bool {
        self.ty == FieldType::Reference
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in: {}, type: {})", self.path, self.location, self.ty)
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Flattened fields of a request or a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Flattened {
    /// Path-qualified names of mandatory fields.
    pub required: BTreeSet<String>,
    /// Every leaf field.
    pub all: BTreeSet<Descriptor>,
}

impl Flattened {
    /// Union `other` into `self`.
    pub fn merge(&mut self, other: Flattened) {
        self.required.extend(other.required);
        self.all.extend(other.all);
    }
}

/// Response status code to the fields of that response's body.
pub type ResponseAttributes = BTreeMap<String, BTreeSet<Descriptor>>;

/// Options for building a [`Specification`](crate::Specification).
#[derive(Debug, Clone)]
pub struct SpecOptions {
    /// Prefix endpoint paths with the document's `basePath`.
    pub base_path: bool,
    /// Check the document against the Swagger 2.0 meta-schema and log findings.
    pub validate: bool,
}

impl SpecOptions {
    /// Default options: keys without `basePath`, validation on.
    pub fn new() -> Self {
        Self {
            base_path: false,
            validate: true,
        }
    }

    /// Include the document's `basePath` in endpoint keys.
    pub fn base_path(mut self, base_path: bool) -> Self {
        self.base_path = base_path;
        self
    }

    /// Enable or disable meta-schema validation.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for SpecOptions {
    fn default() -> Self {
        Self::new()
    }
}
