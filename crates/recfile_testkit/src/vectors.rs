//! Byte-level test vectors for the record encoding.
//!
//! Each vector pins the exact encoding of one record, so other
//! implementations of the format can be checked against the same data.

use recfile_codec::{decode, encode_record, FieldType, Record, Schema, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A record encoding test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Schema description (JSON).
    pub schema: String,
    /// Field values in schema order (JSON numbers or strings).
    pub values: Vec<serde_json::Value>,
    /// Expected encoding (hex).
    pub expected_hex: String,
}

fn vector(
    id: &str,
    description: &str,
    schema: &str,
    values: serde_json::Value,
    hex: &str,
) -> RecordVector {
    RecordVector {
        id: id.into(),
        description: description.into(),
        schema: schema.into(),
        values: values.as_array().cloned().unwrap_or_default(),
        expected_hex: hex.into(),
    }
}

const INT_SCHEMA: &str = r#"{"name":"I","fields":[{"name":"n","type":"int"}]}"#;
const STRING_SCHEMA: &str = r#"{"name":"S","fields":[{"name":"s","type":"string"}]}"#;
const NUM_STR_SCHEMA: &str =
    r#"{"name":"NumStr","fields":[{"name":"num","type":"int"},{"name":"str","type":"string"}]}"#;
const PAIR_SCHEMA: &str =
    r#"{"name":"Pair","fields":[{"name":"left","type":"string"},{"name":"right","type":"string"}]}"#;

/// Record encoding vectors.
pub fn record_vectors() -> Vec<RecordVector> {
    use serde_json::json;

    vec![
        vector("int_0", "zero", INT_SCHEMA, json!([0]), "00"),
        vector("int_neg_1", "minus one zig-zags to 1", INT_SCHEMA, json!([-1]), "01"),
        vector("int_1", "one zig-zags to 2", INT_SCHEMA, json!([1]), "02"),
        vector("int_63", "largest one-byte positive", INT_SCHEMA, json!([63]), "7e"),
        vector("int_neg_64", "largest one-byte negative", INT_SCHEMA, json!([-64]), "7f"),
        vector("int_64", "smallest two-byte value", INT_SCHEMA, json!([64]), "8001"),
        vector("int_max", "i32::MAX", INT_SCHEMA, json!([i32::MAX]), "feffffff0f"),
        vector("int_min", "i32::MIN", INT_SCHEMA, json!([i32::MIN]), "ffffffff0f"),
        vector("string_empty", "empty string", STRING_SCHEMA, json!([""]), "00"),
        vector("string_ascii", "short ASCII", STRING_SCHEMA, json!(["hey"]), "03686579"),
        vector("string_utf8", "multi-byte UTF-8", STRING_SCHEMA, json!(["é"]), "02c3a9"),
        vector("num_str", "int then string", NUM_STR_SCHEMA, json!([-3, "hey"]), "0503686579"),
        vector("pair", "two strings", PAIR_SCHEMA, json!(["L", "R"]), "014c0152"),
    ]
}

/// Builds the record described by `vector`.
///
/// # Errors
///
/// Returns a description of the problem if the vector is malformed.
pub fn record_from_vector(vector: &RecordVector) -> Result<Record, String> {
    let schema = Arc::new(Schema::parse(&vector.schema).map_err(|e| e.to_string())?);
    let values = schema
        .fields()
        .iter()
        .zip(&vector.values)
        .map(|(field, json)| match (field.field_type(), json) {
            (FieldType::Int32, serde_json::Value::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int32)
                .ok_or_else(|| format!("`{}` is not an i32", field.name())),
            (FieldType::String, serde_json::Value::String(s)) => Ok(Value::String(s.clone())),
            _ => Err(format!("`{}` has the wrong JSON type", field.name())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Record::from_values(schema, values).map_err(|e| e.to_string())
}

/// Checks that `vector` encodes and decodes as pinned.
///
/// # Errors
///
/// Returns a description of the first mismatch.
pub fn verify_vector(vector: &RecordVector) -> Result<(), String> {
    let record = record_from_vector(vector)?;
    let encoded = encode_record(&record).map_err(|e| e.to_string())?;
    let actual_hex = hex_encode(&encoded);
    if actual_hex != vector.expected_hex {
        return Err(format!(
            "{}: expected {}, got {actual_hex}",
            vector.id, vector.expected_hex
        ));
    }

    let bytes = hex_decode(&vector.expected_hex)?;
    let decoded = decode(record.schema(), &bytes).map_err(|e| e.to_string())?;
    if decoded != record {
        return Err(format!("{}: decoded record differs", vector.id));
    }
    Ok(())
}

/// Renders every vector as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn vectors_to_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&record_vectors())
}

/// Encodes bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes a hex string.
///
/// # Errors
///
/// Returns an error for odd lengths or non-hex digits.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err(format!("odd hex length {}", hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_vectors_hold() {
        for vector in record_vectors() {
            verify_vector(&vector).unwrap();
        }
    }

    #[test]
    fn vector_ids_are_unique() {
        let vectors = record_vectors();
        let mut ids: Vec<_> = vectors.iter().map(|v| v.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), vectors.len());
    }

    #[test]
    fn vectors_survive_json() {
        let json = vectors_to_json().unwrap();
        let parsed: Vec<RecordVector> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), record_vectors().len());
        verify_vector(&parsed[0]).unwrap();
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(hex_decode("00abff").unwrap(), vec![0x00, 0xab, 0xff]);
        assert!(hex_decode("abc").is_err());
        assert!(hex_decode("zz").is_err());
    }

    #[test]
    fn wrong_json_type_is_reported() {
        let mut vector = record_vectors().remove(0);
        vector.values = vec![serde_json::json!("not a number")];
        assert!(record_from_vector(&vector).is_err());
    }
}
