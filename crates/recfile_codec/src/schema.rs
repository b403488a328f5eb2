//! Record schemas.
//!
//! A [`Schema`] is a named, ordered list of typed fields. Schemas are built
//! either from a JSON description via [`Schema::parse`] or programmatically
//! via [`Schema::builder`]; both paths run the same validation, and the
//! result is immutable.
//!
//! ## Description Format
//!
//! ```json
//! {
//!   "name": "Pair",
//!   "namespace": "example.records",
//!   "fields": [
//!     {"name": "left", "type": "string"},
//!     {"name": "right", "type": "string"}
//!   ]
//! }
//! ```
//!
//! Supported type tags are `string` and `int` (`int32` is accepted as an
//! alias). `namespace` and `doc` are optional.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// 32-bit signed integer.
    Int32,
}

impl FieldType {
    /// Parses a type tag from a schema description.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "int" | "int32" => Some(Self::Int32),
            _ => None,
        }
    }

    /// Returns the canonical type tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int32 => "int",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A named, typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    field_type: FieldType,
}

impl Field {
    /// Creates a field. Names are validated when the field joins a schema.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// Serde representation of a schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDescription {
    /// Record type name.
    pub name: String,
    /// Optional dotted namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Optional free-form documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Ordered field list.
    pub fields: Vec<FieldDescription>,
}

/// Serde representation of one field in a schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescription {
    /// Field name.
    pub name: String,
    /// Type tag, e.g. `"string"` or `"int"`.
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// An immutable record schema.
///
/// Two schemas compare equal when their names, namespaces, docs and fields
/// are equal. Writer/reader compatibility only looks at fields; see
/// [`Schema::same_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    fields: Vec<Field>,
}

impl Schema {
    /// Parses a JSON schema description.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidSchema`] if the text is not valid JSON,
    /// a required key is missing, a type tag is unknown, a name is not a
    /// valid identifier, or field names repeat.
    pub fn parse(description: &str) -> CodecResult<Self> {
        let description: SchemaDescription = serde_json::from_str(description)
            .map_err(|e| CodecError::invalid_schema(e.to_string()))?;
        Self::from_description(description)
    }

    /// Builds a schema from an already deserialized description.
    ///
    /// # Errors
    ///
    /// Same validation as [`Schema::parse`].
    pub fn from_description(description: SchemaDescription) -> CodecResult<Self> {
        let mut fields = Vec::with_capacity(description.fields.len());
        for field in description.fields {
            let field_type = FieldType::from_tag(&field.type_tag).ok_or_else(|| {
                CodecError::invalid_schema(format!(
                    "field `{}` has unsupported type `{}`",
                    field.name, field.type_tag
                ))
            })?;
            fields.push(Field::new(field.name, field_type));
        }
        Self::validated(
            description.name,
            description.namespace,
            description.doc,
            fields,
        )
    }

    /// Starts building a schema with the given record name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            namespace: None,
            doc: None,
            fields: Vec::new(),
        }
    }

    fn validated(
        name: String,
        namespace: Option<String>,
        doc: Option<String>,
        fields: Vec<Field>,
    ) -> CodecResult<Self> {
        if name.is_empty() {
            return Err(CodecError::invalid_schema("schema name is empty"));
        }
        if !is_identifier(&name) {
            return Err(CodecError::invalid_schema(format!(
                "schema name `{name}` is not a valid identifier"
            )));
        }
        if let Some(ns) = &namespace {
            if !ns.split('.').all(is_identifier) {
                return Err(CodecError::invalid_schema(format!(
                    "namespace `{ns}` is not a dotted identifier"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !is_identifier(field.name()) {
                return Err(CodecError::invalid_schema(format!(
                    "field name `{}` is not a valid identifier",
                    field.name()
                )));
            }
            if !seen.insert(field.name()) {
                return Err(CodecError::invalid_schema(format!(
                    "duplicate field name `{}`",
                    field.name()
                )));
            }
        }

        Ok(Self {
            name,
            namespace,
            doc,
            fields,
        })
    }

    /// Returns the record type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the documentation string, if any.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Returns `namespace.name`, or just the name without a namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the position of the named field.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns `true` if both schemas declare the same fields (name and type)
    /// in the same order. Record names and namespaces are ignored.
    #[must_use]
    pub fn same_fields(&self, other: &Schema) -> bool {
        self.fields == other.fields
    }

    /// Converts the schema back into its serde description.
    #[must_use]
    pub fn to_description(&self) -> SchemaDescription {
        SchemaDescription {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            doc: self.doc.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDescription {
                    name: f.name.clone(),
                    type_tag: f.field_type.tag().to_string(),
                })
                .collect(),
        }
    }

    /// Renders the canonical compact JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncodingFailed`] if serialization fails.
    pub fn to_json(&self) -> CodecResult<String> {
        serde_json::to_string(&self.to_description())
            .map_err(|e| CodecError::encoding_failed(e.to_string()))
    }
}

impl FromStr for Schema {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<SchemaDescription> for Schema {
    type Error = CodecError;

    fn try_from(description: SchemaDescription) -> Result<Self, Self::Error> {
        Self::from_description(description)
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Sets the namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(Field::new(name, field_type));
        self
    }

    /// Validates and builds the schema.
    ///
    /// # Errors
    ///
    /// Same validation as [`Schema::parse`].
    pub fn build(self) -> CodecResult<Schema> {
        Schema::validated(self.name, self.namespace, self.doc, self.fields)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: &str = r#"{
        "name": "Pair",
        "namespace": "example.records",
        "fields": [
            {"name": "left", "type": "string"},
            {"name": "right", "type": "string"}
        ]
    }"#;

    #[test]
    fn parse_pair_schema() {
        let schema = Schema::parse(PAIR).unwrap();
        assert_eq!(schema.name(), "Pair");
        assert_eq!(schema.namespace(), Some("example.records"));
        assert_eq!(schema.full_name(), "example.records.Pair");
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields()[0], Field::new("left", FieldType::String));
        assert_eq!(schema.fields()[1], Field::new("right", FieldType::String));
        assert_eq!(schema.index_of("right"), Some(1));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn parse_int_aliases() {
        let schema = Schema::parse(
            r#"{"name":"N","fields":[{"name":"a","type":"int"},{"name":"b","type":"int32"}]}"#,
        )
        .unwrap();
        assert!(schema
            .fields()
            .iter()
            .all(|f| f.field_type() == FieldType::Int32));
    }

    #[test]
    fn json_roundtrip_is_canonical() {
        let schema = Schema::parse(PAIR).unwrap();
        let json = schema.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"name":"Pair","namespace":"example.records","fields":[{"name":"left","type":"string"},{"name":"right","type":"string"}]}"#
        );
        assert_eq!(Schema::parse(&json).unwrap(), schema);
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            Schema::parse("{not json"),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn reject_missing_name() {
        let err = Schema::parse(r#"{"fields":[]}"#).unwrap_err();
        assert!(matches!(err, CodecError::InvalidSchema { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn reject_empty_name() {
        assert!(matches!(
            Schema::parse(r#"{"name":"","fields":[]}"#),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn reject_duplicate_fields() {
        let err = Schema::parse(
            r#"{"name":"D","fields":[{"name":"x","type":"int"},{"name":"x","type":"string"}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CodecError::invalid_schema("duplicate field name `x`")
        );
    }

    #[test]
    fn reject_unknown_type_tag() {
        let err = Schema::parse(r#"{"name":"U","fields":[{"name":"f","type":"double"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported type `double`"));
    }

    #[test]
    fn reject_unknown_keys() {
        assert!(matches!(
            Schema::parse(r#"{"name":"U","fields":[],"aliases":["V"]}"#),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn reject_bad_identifiers() {
        assert!(Schema::builder("1abc").build().is_err());
        assert!(Schema::builder("ok")
            .field("has space", FieldType::Int32)
            .build()
            .is_err());
        assert!(Schema::builder("ok").namespace("a..b").build().is_err());
        assert!(Schema::builder("_ok")
            .namespace("a.b_2")
            .field("_x1", FieldType::Int32)
            .build()
            .is_ok());
    }

    #[test]
    fn builder_matches_parse() {
        let built = Schema::builder("Pair")
            .namespace("example.records")
            .field("left", FieldType::String)
            .field("right", FieldType::String)
            .build()
            .unwrap();
        assert_eq!(built, Schema::parse(PAIR).unwrap());
    }

    #[test]
    fn zero_field_schema_is_valid() {
        let schema: Schema = r#"{"name":"Empty","fields":[]}"#.parse().unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn same_fields_ignores_names() {
        let a = Schema::builder("A")
            .field("num", FieldType::Int32)
            .build()
            .unwrap();
        let b = Schema::builder("B")
            .namespace("other")
            .field("num", FieldType::Int32)
            .build()
            .unwrap();
        let c = Schema::builder("A")
            .field("num", FieldType::String)
            .build()
            .unwrap();
        assert!(a.same_fields(&b));
        assert!(!a.same_fields(&c));
        assert_ne!(a, b);
    }
}
