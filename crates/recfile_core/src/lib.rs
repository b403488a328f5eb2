//! # RecFile Core
//!
//! Record containers for RecFile: a header embedding the schema, a FIFO
//! sequence of checksummed record frames and an explicit end frame.
//!
//! This crate provides:
//! - [`ContainerWriter`] for append-only writing
//! - [`ContainerReader`] for sequential reading, optionally through a
//!   projection schema
//! - [`verify_container`] for whole-container checks
//!
//! ## Example
//!
//! ```
//! use recfile_codec::{FieldType, Record, Schema};
//! use recfile_core::{ContainerConfig, ContainerReader, ContainerWriter};
//! use recfile_storage::InMemoryBackend;
//!
//! let schema = Schema::builder("Row")
//!     .field("num", FieldType::Int32)
//!     .field("str", FieldType::String)
//!     .build()
//!     .unwrap();
//!
//! let mut writer = ContainerWriter::from_backend(
//!     InMemoryBackend::new(),
//!     schema,
//!     ContainerConfig::default(),
//! )
//! .unwrap();
//! for n in [3, 1, 2] {
//!     let record = Record::new(writer.schema().clone())
//!         .with("num", n).unwrap()
//!         .with("str", "x").unwrap();
//!     writer.append(&record).unwrap();
//! }
//! let backend = writer.close_into_backend().unwrap();
//!
//! let projection = Schema::builder("Row").field("num", FieldType::Int32).build().unwrap();
//! let reader = ContainerReader::from_backend_with_projection(
//!     Box::new(backend),
//!     &projection,
//!     ContainerConfig::default(),
//! )
//! .unwrap();
//!
//! let nums: Vec<_> = reader
//!     .map(|r| r.unwrap().get_int32("num").unwrap().unwrap())
//!     .collect();
//! assert_eq!(nums, vec![3, 1, 2]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod format;
mod reader;
mod verify;
mod writer;

pub use config::ContainerConfig;
pub use error::{CoreError, CoreResult};
pub use reader::{ContainerReader, ReaderState};
pub use verify::{verify_container, verify_file, ContainerStats};
pub use writer::{ContainerWriter, WriterState};
