//! Test fixtures and container helpers.
//!
//! Provides convenience functions for building schemas, records and
//! containers in tests.

use recfile_codec::{FieldType, Record, Schema};
use recfile_core::{ContainerConfig, ContainerReader, ContainerWriter};
use recfile_storage::{InMemoryBackend, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// The `{num: int, str: string}` schema used across scenarios.
pub fn num_str_schema() -> Arc<Schema> {
    Arc::new(
        Schema::parse(
            r#"{"name":"NumStr","fields":[{"name":"num","type":"int"},{"name":"str","type":"string"}]}"#,
        )
        .expect("Invalid fixture schema"),
    )
}

/// The `{num: int}` projection of [`num_str_schema`].
pub fn num_only_schema() -> Schema {
    Schema::builder("NumStr")
        .field("num", FieldType::Int32)
        .build()
        .expect("Invalid fixture schema")
}

/// The `{left: string, right: string}` schema.
pub fn pair_schema() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Pair")
            .field("left", FieldType::String)
            .field("right", FieldType::String)
            .build()
            .expect("Invalid fixture schema"),
    )
}

/// Builds a `NumStr` record with `str` set to the decimal form of `num`.
pub fn num_str_record(schema: &Arc<Schema>, num: i32) -> Record {
    Record::new(Arc::clone(schema))
        .with("num", num)
        .and_then(|r| r.with("str", num.to_string()))
        .expect("Record does not fit schema")
}

/// Writes `records` to a fresh in-memory container and returns the backend.
pub fn memory_container(schema: &Arc<Schema>, records: &[Record]) -> Box<dyn StorageBackend> {
    Box::new(InMemoryBackend::with_data(container_bytes(schema, records)))
}

/// Returns the raw bytes of an in-memory container.
pub fn container_bytes(schema: &Arc<Schema>, records: &[Record]) -> Vec<u8> {
    let mut writer = ContainerWriter::from_backend(
        InMemoryBackend::new(),
        Arc::clone(schema),
        ContainerConfig::default(),
    )
    .expect("Failed to create container");
    for record in records {
        writer.append(record).expect("Failed to append record");
    }
    writer
        .close_into_backend()
        .expect("Failed to close container")
        .into_data()
}

/// Reads every record from a container backend.
pub fn read_all(backend: Box<dyn StorageBackend>) -> Vec<Record> {
    ContainerReader::from_backend(backend, ContainerConfig::default())
        .expect("Failed to open container")
        .collect::<Result<_, _>>()
        .expect("Failed to read container")
}

/// A container file in a temporary directory, removed on drop.
pub struct TestContainer {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestContainer {
    /// Creates a path for a container that does not exist yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: temp_dir.path().join("test.recf"),
            _temp_dir: temp_dir,
        }
    }

    /// Creates a container file holding `records`.
    pub fn with_records(schema: &Arc<Schema>, records: &[Record]) -> Self {
        let container = Self::new();
        let mut writer = ContainerWriter::create(container.path(), Arc::clone(schema))
            .expect("Failed to create container");
        for record in records {
            writer.append(record).expect("Failed to append record");
        }
        writer.close().expect("Failed to close container");
        container
    }

    /// Returns the container path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for TestContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with the path of a temporary container holding `records`.
pub fn with_temp_container<F, R>(schema: &Arc<Schema>, records: &[Record], f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let container = TestContainer::with_records(schema, records);
    f(container.path())
}
