//! Benchmark utilities.

use recfile_codec::{FieldType, Record, Schema};
use std::sync::Arc;

/// A schema of `ints` integer fields followed by `strings` string fields.
pub fn wide_schema(ints: usize, strings: usize) -> Arc<Schema> {
    let builder = (0..ints).fold(Schema::builder("Wide"), |b, i| {
        b.field(format!("i{i}"), FieldType::Int32)
    });
    let builder = (0..strings).fold(builder, |b, i| b.field(format!("s{i}"), FieldType::String));
    Arc::new(builder.build().expect("Invalid bench schema"))
}

/// Deterministic records for `schema` with strings of `string_len` bytes.
pub fn generate_records(schema: &Arc<Schema>, count: usize, string_len: usize) -> Vec<Record> {
    (0..count)
        .map(|n| {
            let mut record = Record::new(Arc::clone(schema));
            for (i, field) in schema.fields().iter().enumerate() {
                let seed = n.wrapping_mul(31).wrapping_add(i);
                let result = match field.field_type() {
                    FieldType::Int32 => {
                        let value = (seed as i32).wrapping_mul(2_654_435_761_u32 as i32);
                        record.set(field.name(), value)
                    }
                    FieldType::String => {
                        let text: String = (0..string_len)
                            .map(|k| char::from(b'a' + ((seed + k) % 26) as u8))
                            .collect();
                        record.set(field.name(), text)
                    }
                };
                result.expect("Bench value does not fit schema");
            }
            record
        })
        .collect()
}
