//! Schema-bound records.

use crate::error::{CodecError, CodecResult};
use crate::schema::{Field, FieldType, Schema};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A record bound to a runtime [`Schema`].
///
/// A record holds one slot per schema field, in schema order. A slot is
/// either a value of the field's declared type or *unset* (`None`). Unset is
/// distinct from an empty string or zero: fields skipped by a projection
/// read back as unset.
///
/// Field access is checked by name and type.
///
/// # Example
///
/// ```
/// use recfile_codec::{FieldType, Record, Schema};
/// use std::sync::Arc;
///
/// let schema = Arc::new(
///     Schema::builder("Pair")
///         .field("left", FieldType::String)
///         .field("right", FieldType::String)
///         .build()
///         .unwrap(),
/// );
///
/// let record = Record::new(schema)
///     .with("left", "L")
///     .unwrap()
///     .with("right", "R")
///     .unwrap();
/// assert_eq!(record.get_str("left").unwrap(), Some("L"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
}

impl Record {
    /// Creates a record with every field unset.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Creates a fully populated record from values in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaMismatch`] if the number of values differs
    /// from the number of fields, or [`CodecError::TypeMismatch`] if a value
    /// has the wrong type.
    pub fn from_values(schema: Arc<Schema>, values: Vec<Value>) -> CodecResult<Self> {
        if values.len() != schema.len() {
            return Err(CodecError::schema_mismatch(format!(
                "schema `{}` has {} fields, got {} values",
                schema.name(),
                schema.len(),
                values.len()
            )));
        }
        for (field, value) in schema.fields().iter().zip(&values) {
            check_type(field, value.field_type())?;
        }
        Ok(Self {
            schema,
            values: values.into_iter().map(Some).collect(),
        })
    }

    /// Slots must already match the schema's arity and types.
    pub(crate) fn from_slots(schema: Arc<Schema>, values: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    /// Returns the schema this record is bound to.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the slots in schema order.
    #[must_use]
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Sets a field value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`] or [`CodecError::TypeMismatch`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> CodecResult<()> {
        let value = value.into();
        let index = self.lookup(name)?;
        check_type(&self.schema.fields()[index], value.field_type())?;
        self.values[index] = Some(value);
        Ok(())
    }

    /// Builder-style variant of [`Record::set`].
    ///
    /// # Errors
    ///
    /// Same as [`Record::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> CodecResult<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Resets a field to unset, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`].
    pub fn unset(&mut self, name: &str) -> CodecResult<Option<Value>> {
        let index = self.lookup(name)?;
        Ok(self.values[index].take())
    }

    /// Returns the value of a field, or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`].
    pub fn get(&self, name: &str) -> CodecResult<Option<&Value>> {
        let index = self.lookup(name)?;
        Ok(self.values[index].as_ref())
    }

    /// Returns a string field, or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`], or [`CodecError::TypeMismatch`]
    /// if the field is not a string field.
    pub fn get_str(&self, name: &str) -> CodecResult<Option<&str>> {
        let index = self.lookup(name)?;
        check_type(&self.schema.fields()[index], FieldType::String)?;
        Ok(self.values[index].as_ref().and_then(Value::as_str))
    }

    /// Returns an integer field, or `None` if it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`], or [`CodecError::TypeMismatch`]
    /// if the field is not an integer field.
    pub fn get_int32(&self, name: &str) -> CodecResult<Option<i32>> {
        let index = self.lookup(name)?;
        check_type(&self.schema.fields()[index], FieldType::Int32)?;
        Ok(self.values[index].as_ref().and_then(Value::as_int32))
    }

    /// Returns `true` if the named field holds a value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownField`].
    pub fn is_set(&self, name: &str) -> CodecResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Returns the first unset field, if any.
    #[must_use]
    pub fn first_unset(&self) -> Option<&Field> {
        self.values
            .iter()
            .position(Option::is_none)
            .map(|i| &self.schema.fields()[i])
    }

    /// Returns `true` if every field is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Iterates `(field, slot)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, Option<&Value>)> {
        self.schema
            .fields()
            .iter()
            .zip(self.values.iter().map(Option::as_ref))
    }

    fn lookup(&self, name: &str) -> CodecResult<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| CodecError::unknown_field(name))
    }
}

/// Renders `Name { field: value, .. }`, with `-` for unset slots.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.schema.name())?;
        for (i, (field, value)) in self.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            match value {
                Some(value) => write!(f, "{sep}{}: {value}", field.name())?,
                None => write!(f, "{sep}{}: -", field.name())?,
            }
        }
        write!(f, " }}")
    }
}

fn check_type(field: &Field, actual: FieldType) -> CodecResult<()> {
    if field.field_type() == actual {
        Ok(())
    } else {
        Err(CodecError::TypeMismatch {
            field: field.name().to_string(),
            expected: field.field_type(),
            actual,
        })
    }
}
