//! Whole-container verification.

use crate::config::ContainerConfig;
use crate::error::CoreResult;
use crate::reader::ContainerReader;
use recfile_storage::StorageBackend;
use std::path::Path;
use tracing::debug;

/// Summary of a verified container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    /// Number of records.
    pub record_count: u64,
    /// Header length in bytes, including the embedded schema.
    pub header_len: u64,
    /// Sum of record payload lengths.
    pub payload_bytes: u64,
    /// Total container size.
    pub total_bytes: u64,
}

/// Reads and decodes every record of the container held by `backend`.
///
/// # Errors
///
/// Returns the first format, checksum or codec error encountered.
pub fn verify_container(backend: Box<dyn StorageBackend>) -> CoreResult<ContainerStats> {
    let mut reader = ContainerReader::from_backend(backend, ContainerConfig::default())?;
    while reader.has_next() {
        reader.next_record()?;
    }

    let stats = ContainerStats {
        record_count: reader.records_read(),
        header_len: reader.header_len(),
        payload_bytes: reader.payload_bytes(),
        total_bytes: reader.total_bytes(),
    };
    debug!("Verified container: {:?}", stats);
    Ok(stats)
}

/// Verifies a container file.
///
/// # Errors
///
/// See [`verify_container`].
pub fn verify_file(path: &Path) -> CoreResult<ContainerStats> {
    let backend = recfile_storage::FileBackend::open_read_only(path)?;
    verify_container(Box::new(backend))
}
