//! # RecFile Testkit
//!
//! Test utilities for RecFile.
//!
//! This crate provides:
//! - Fixtures for temporary and in-memory containers
//! - Property-based test generators using proptest
//! - Fuzz harnesses for the decoder, reader and schema parser
//! - Byte-level test vectors for the record encoding
//!
//! ## Usage
//!
//! ```rust
//! use recfile_testkit::prelude::*;
//!
//! let schema = num_str_schema();
//! let records: Vec<_> = (0..3).map(|n| num_str_record(&schema, n)).collect();
//! let read = read_all(memory_container(&schema, &records));
//! assert_eq!(read, records);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use vectors::*;
