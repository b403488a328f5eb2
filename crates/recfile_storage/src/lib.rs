//! # RecFile Storage
//!
//! Byte-store backends underneath RecFile containers.
//!
//! Backends are **opaque byte stores**: they know nothing about headers,
//! frames or schemas. The container format in `recfile_core` owns all
//! interpretation of the bytes.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and in-memory containers
//! - [`FileBackend`] - For files, guarded by an advisory lock
//!
//! ## Example
//!
//! ```rust
//! use recfile_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
