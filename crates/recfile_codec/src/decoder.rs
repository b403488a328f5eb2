//! Record decoder.

use crate::error::{CodecError, CodecResult};
use crate::projection::ProjectionPlan;
use crate::record::Record;
use crate::schema::{FieldType, Schema};
use crate::value::Value;
use crate::varint;
use std::sync::Arc;

/// Default maximum string length accepted by the decoder.
/// This prevents allocation-based DoS from untrusted input.
pub const DEFAULT_MAX_STRING_LEN: u64 = 256 * 1024 * 1024;

/// Limits applied while decoding untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum byte length of a single string field.
    pub max_string_len: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

/// Decodes a record that was encoded with `schema`.
///
/// # Errors
///
/// Returns an error if the bytes are truncated, contain invalid UTF-8 or an
/// overlong varint, or have trailing bytes.
pub fn decode(schema: &Arc<Schema>, source: &[u8]) -> CodecResult<Record> {
    RecordDecoder::new(Arc::clone(schema)).decode(source)
}

/// A decoder for payloads written with one schema, optionally projected.
///
/// The decoder always walks the full writer layout. Fields outside the
/// projection are skipped without allocating or validating UTF-8, and come
/// back unset in the returned record.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    schema: Arc<Schema>,
    plan: ProjectionPlan,
    limits: DecodeLimits,
}

impl RecordDecoder {
    /// Creates a decoder materializing every field of `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        let plan = ProjectionPlan::full(&schema);
        Self {
            schema,
            plan,
            limits: DecodeLimits::default(),
        }
    }

    /// Creates a decoder for `writer` payloads that materializes only the
    /// fields of `projection`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaMismatch`] if `projection` is not an
    /// ordered subset of `writer`.
    pub fn with_projection(writer: Arc<Schema>, projection: &Schema) -> CodecResult<Self> {
        let plan = ProjectionPlan::new(&writer, projection)?;
        Ok(Self {
            schema: writer,
            plan,
            limits: DecodeLimits::default(),
        })
    }

    /// Replaces the decode limits.
    #[must_use]
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the writer schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the projection plan in use.
    #[must_use]
    pub fn plan(&self) -> &ProjectionPlan {
        &self.plan
    }

    /// Decodes one record payload.
    ///
    /// # Errors
    ///
    /// See [`decode`]. String lengths above the configured limit fail with
    /// [`CodecError::SizeLimitExceeded`].
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Record> {
        let mut cursor = Cursor { data: bytes, pos: 0 };
        let mut values = Vec::with_capacity(self.schema.len());

        for (index, field) in self.schema.fields().iter().enumerate() {
            let keep = self.plan.keeps(index);
            let value = match field.field_type() {
                FieldType::Int32 => {
                    let n = cursor.read_i32()?;
                    keep.then_some(Value::Int32(n))
                }
                FieldType::String => {
                    let raw = cursor.read_string_bytes(self.limits.max_string_len)?;
                    if keep {
                        let text = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
                        Some(Value::String(text.to_string()))
                    } else {
                        None
                    }
                }
            };
            values.push(value);
        }

        if !cursor.is_empty() {
            return Err(CodecError::TrailingBytes {
                count: cursor.remaining(),
            });
        }

        Ok(Record::from_slots(Arc::clone(&self.schema), values))
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_i32(&mut self) -> CodecResult<i32> {
        varint::read_i32(self.data, &mut self.pos)
    }

    fn read_string_bytes(&mut self, max_len: u64) -> CodecResult<&'a [u8]> {
        let len = u64::from(varint::read_u32(self.data, &mut self.pos)?);
        if len > max_len {
            return Err(CodecError::SizeLimitExceeded {
                claimed: len,
                max_allowed: max_len,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let len = len as usize;
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}
