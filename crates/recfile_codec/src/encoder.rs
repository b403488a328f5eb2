//! Record encoder.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use crate::varint;
use std::sync::Arc;

/// Encodes `record` with `schema`, appending the bytes to `sink`.
///
/// Fields are written in schema order with no tags or names:
/// - strings as a varint byte length followed by UTF-8 bytes
/// - 32-bit integers as zig-zag varints
///
/// On error `sink` is left unchanged.
///
/// # Errors
///
/// Returns [`CodecError::SchemaMismatch`] if the record's fields differ from
/// `schema` or a field is unset.
pub fn encode(record: &Record, schema: &Schema, sink: &mut Vec<u8>) -> CodecResult<()> {
    check_record(record, schema)?;
    let start = sink.len();
    for value in record.values().iter().flatten() {
        if let Err(e) = encode_value(value, sink) {
            sink.truncate(start);
            return Err(e);
        }
    }
    Ok(())
}

/// Encodes a record with its own schema.
///
/// # Errors
///
/// Returns [`CodecError::SchemaMismatch`] if a field is unset.
pub fn encode_record(record: &Record) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    encode(record, record.schema(), &mut out)?;
    Ok(out)
}

/// A reusable encoder bound to one schema.
///
/// Holds an output buffer so a writer can encode many records without
/// reallocating.
#[derive(Debug)]
pub struct RecordEncoder {
    schema: Arc<Schema>,
    buffer: Vec<u8>,
}

impl RecordEncoder {
    /// Create a new encoder for `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_capacity(schema, 0)
    }

    /// Create a new encoder with the specified buffer capacity.
    pub fn with_capacity(schema: Arc<Schema>, capacity: usize) -> Self {
        Self {
            schema,
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the schema this encoder writes.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Replaces the buffer contents with the encoding of `record`.
    ///
    /// # Errors
    ///
    /// Same as [`encode`]. The buffer is empty after an error.
    pub fn encode(&mut self, record: &Record) -> CodecResult<&[u8]> {
        self.buffer.clear();
        encode(record, &self.schema, &mut self.buffer)?;
        Ok(&self.buffer)
    }

    /// Get a reference to the last encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

fn check_record(record: &Record, schema: &Schema) -> CodecResult<()> {
    let same =
        std::ptr::eq(record.schema().as_ref(), schema) || record.schema().same_fields(schema);
    if !same {
        return Err(CodecError::schema_mismatch(format!(
            "record of `{}` does not match the fields of `{}`",
            record.schema().name(),
            schema.name()
        )));
    }
    if let Some(field) = record.first_unset() {
        return Err(CodecError::schema_mismatch(format!(
            "field `{}` of `{}` is unset",
            field.name(),
            schema.name()
        )));
    }
    Ok(())
}

fn encode_value(value: &Value, sink: &mut Vec<u8>) -> CodecResult<()> {
    match value {
        Value::String(s) => {
            let len = u32::try_from(s.len()).map_err(|_| CodecError::SizeLimitExceeded {
                claimed: s.len() as u64,
                max_allowed: u64::from(u32::MAX),
            })?;
            varint::write_u32(len, sink);
            sink.extend_from_slice(s.as_bytes());
        }
        Value::Int32(n) => varint::write_i32(*n, sink),
    }
    Ok(())
}
