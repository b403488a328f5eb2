//! # RecFile Codec
//!
//! Schema model and compact binary record encoding for RecFile.
//!
//! Records are encoded field by field in schema order. The encoding carries
//! no field names or type tags, so the reader must know the writer's schema
//! (containers embed it in their header).
//!
//! ## Encoding Rules
//!
//! - Strings: varint byte length, then UTF-8 bytes
//! - 32-bit integers: zig-zag mapped, then LEB128 varint (1-5 bytes)
//! - No padding, no per-record header
//!
//! ## Usage
//!
//! ```
//! use recfile_codec::{decode, encode_record, Record, Schema};
//! use std::sync::Arc;
//!
//! let schema = Arc::new(Schema::parse(
//!     r#"{"name":"Pair","fields":[{"name":"left","type":"string"},{"name":"right","type":"string"}]}"#,
//! ).unwrap());
//!
//! let record = Record::new(schema.clone())
//!     .with("left", "L").unwrap()
//!     .with("right", "R").unwrap();
//!
//! let bytes = encode_record(&record).unwrap();
//! let decoded = decode(&schema, &bytes).unwrap();
//! assert_eq!(record, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod projection;
mod record;
mod schema;
mod value;
pub mod varint;

pub use decoder::{decode, DecodeLimits, RecordDecoder, DEFAULT_MAX_STRING_LEN};
pub use encoder::{encode, encode_record, RecordEncoder};
pub use error::{CodecError, CodecResult};
pub use projection::ProjectionPlan;
pub use record::Record;
pub use schema::{Field, FieldDescription, FieldType, Schema, SchemaBuilder, SchemaDescription};
pub use value::Value;
