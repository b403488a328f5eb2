//! Read-time projection.
//!
//! A [`ProjectionPlan`] records, for each field of a writer schema, whether
//! the decoder should materialize it. The payload is always walked in full
//! because it was laid out with the writer schema.

use crate::error::{CodecError, CodecResult};
use crate::schema::{Field, Schema};

/// Which writer fields a decoder materializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionPlan {
    keep: Vec<bool>,
}

impl ProjectionPlan {
    /// A plan that keeps every field of `writer`.
    #[must_use]
    pub fn full(writer: &Schema) -> Self {
        Self {
            keep: vec![true; writer.len()],
        }
    }

    /// Plans reading `writer` payloads through `projection`.
    ///
    /// Every projected field must exist in the writer schema with the same
    /// type, and projected fields must keep their relative writer order.
    /// Record names are not compared.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaMismatch`] otherwise.
    pub fn new(writer: &Schema, projection: &Schema) -> CodecResult<Self> {
        let mut keep = vec![false; writer.len()];
        let mut previous: Option<(usize, &str)> = None;

        for field in projection.fields() {
            let index = writer.index_of(field.name()).ok_or_else(|| {
                CodecError::schema_mismatch(format!(
                    "projected field `{}` is not present in schema `{}`",
                    field.name(),
                    writer.name()
                ))
            })?;

            let written = &writer.fields()[index];
            if written.field_type() != field.field_type() {
                return Err(CodecError::schema_mismatch(format!(
                    "projected field `{}` is {} but schema `{}` declares {}",
                    field.name(),
                    field.field_type(),
                    writer.name(),
                    written.field_type()
                )));
            }

            if let Some((prev_index, prev_name)) = previous {
                if index < prev_index {
                    return Err(CodecError::schema_mismatch(format!(
                        "projected field `{}` precedes `{prev_name}` in schema `{}`",
                        field.name(),
                        writer.name()
                    )));
                }
            }
            previous = Some((index, field.name()));
            keep[index] = true;
        }

        Ok(Self { keep })
    }

    /// Returns `true` if the writer field at `index` is materialized.
    #[must_use]
    pub fn keeps(&self, index: usize) -> bool {
        self.keep.get(index).copied().unwrap_or(false)
    }

    /// Number of materialized fields.
    #[must_use]
    pub fn projected_len(&self) -> usize {
        self.keep.iter().filter(|k| **k).count()
    }

    /// Returns `true` if no field is skipped.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.keep.iter().all(|k| *k)
    }

    /// Writer fields this plan skips.
    pub fn skipped_fields<'a>(&'a self, writer: &'a Schema) -> impl Iterator<Item = &'a Field> {
        writer
            .fields()
            .iter()
            .zip(&self.keep)
            .filter(|(_, keep)| !**keep)
            .map(|(field, _)| field)
    }
}
