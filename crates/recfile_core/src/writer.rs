//! Container writer.

use crate::config::ContainerConfig;
use crate::error::{CoreError, CoreResult};
use crate::format::{encode_end_frame, encode_header, encode_record_frame};
use recfile_codec::{Record, RecordEncoder, Schema};
use recfile_storage::{FileBackend, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Lifecycle of a [`ContainerWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Accepting records.
    Open,
    /// End frame written and backend released.
    Closed,
    /// A storage error interrupted a write. The backend was released
    /// without an end frame.
    Failed,
}

/// Appends records to a new container.
///
/// The header, embedding the schema, is produced at creation. Records are
/// framed and buffered in memory, then appended to the backend whenever the
/// buffer reaches [`ContainerConfig::write_buffer_size`]. [`close`] writes
/// the end frame, flushes and releases the backend (and its file lock).
///
/// A storage error moves the writer to [`WriterState::Failed`]: the end
/// frame is never written, so readers see the container as truncated, and
/// every later call fails with [`CoreError::WriterFailed`].
///
/// Dropping an open writer closes it on a best-effort basis.
///
/// # Example
///
/// ```no_run
/// use recfile_codec::{FieldType, Record, Schema};
/// use recfile_core::ContainerWriter;
/// use std::path::Path;
///
/// let schema = Schema::builder("Row").field("num", FieldType::Int32).build().unwrap();
/// let mut writer = ContainerWriter::create(Path::new("rows.recf"), schema).unwrap();
/// let record = Record::new(writer.schema().clone()).with("num", 7).unwrap();
/// writer.append(&record).unwrap();
/// writer.close().unwrap();
/// ```
///
/// [`close`]: ContainerWriter::close
pub struct ContainerWriter<B: StorageBackend> {
    backend: Option<B>,
    path: Option<PathBuf>,
    encoder: RecordEncoder,
    pending: Vec<u8>,
    config: ContainerConfig,
    state: WriterState,
    records_written: u64,
}

impl ContainerWriter<FileBackend> {
    /// Creates a container file at `path`, truncating any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or is locked by
    /// another writer or reader.
    pub fn create(path: &Path, schema: impl Into<Arc<Schema>>) -> CoreResult<Self> {
        Self::create_with_config(path, schema, ContainerConfig::default())
    }

    /// Creates a container file with a custom configuration.
    ///
    /// # Errors
    ///
    /// See [`ContainerWriter::create`].
    pub fn create_with_config(
        path: &Path,
        schema: impl Into<Arc<Schema>>,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        let backend = FileBackend::create(path)?;
        let mut writer = Self::init(backend, schema.into(), config)?;
        writer.path = Some(path.to_path_buf());
        debug!(
            "Created container {:?} for schema {}",
            path,
            writer.schema().full_name()
        );
        Ok(writer)
    }
}

impl<B: StorageBackend> ContainerWriter<B> {
    /// Creates a container on an empty backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if the backend already holds
    /// data.
    pub fn from_backend(
        backend: B,
        schema: impl Into<Arc<Schema>>,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        let writer = Self::init(backend, schema.into(), config)?;
        debug!(
            "Created in-memory container for schema {}",
            writer.schema().full_name()
        );
        Ok(writer)
    }

    fn init(backend: B, schema: Arc<Schema>, config: ContainerConfig) -> CoreResult<Self> {
        let size = backend.size()?;
        if size != 0 {
            return Err(CoreError::invalid_operation(format!(
                "cannot start a container on a backend holding {size} bytes"
            )));
        }

        let pending = encode_header(&schema)?;
        Ok(Self {
            backend: Some(backend),
            path: None,
            encoder: RecordEncoder::new(schema),
            pending,
            config,
            state: WriterState::Open,
            records_written: 0,
        })
    }

    /// Returns the container schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        self.encoder.schema()
    }

    /// Returns the writer state.
    #[must_use]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns the number of records accepted so far.
    ///
    /// An append that fails is not counted.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Returns the file path, if the container is file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one record.
    ///
    /// # Errors
    ///
    /// - [`CoreError::WriterClosed`] after [`close`](Self::close)
    /// - [`CoreError::WriterFailed`] after an earlier storage error
    /// - [`CoreError::SchemaMismatch`] if the record's fields differ from
    ///   the container schema or a field is unset
    /// - [`CoreError::RecordTooLarge`] if the encoding exceeds
    ///   [`ContainerConfig::max_record_size`]
    /// - storage errors while flushing the write buffer, after which the
    ///   writer is failed
    pub fn append(&mut self, record: &Record) -> CoreResult<()> {
        self.ensure_open()?;

        let payload = self.encoder.encode(record)?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= self.config.max_record_size)
            .ok_or(CoreError::RecordTooLarge {
                size: payload.len() as u64,
                max: u64::from(self.config.max_record_size),
            })?;

        encode_record_frame(payload, len, &mut self.pending);
        if self.pending.len() >= self.config.write_buffer_size {
            self.flush_pending()?;
        }

        self.records_written += 1;
        trace!("Framed record {} ({} bytes)", self.records_written, len);
        Ok(())
    }

    /// Appends buffered frames to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WriterClosed`] after close,
    /// [`CoreError::WriterFailed`] after an earlier storage error, or a
    /// storage error, after which the writer is failed.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.flush_pending()?;
        let result = match self.backend.as_mut() {
            Some(backend) => backend.flush(),
            None => Ok(()),
        };
        result.map_err(|e| self.fail(e.into()))
    }

    /// Writes the end frame, flushes and releases the backend.
    ///
    /// Closing a closed writer does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WriterFailed`] if an earlier storage error
    /// failed the writer, or a storage error if the final write or sync
    /// fails. Either way the writer ends up [`WriterState::Failed`].
    pub fn close(&mut self) -> CoreResult<()> {
        self.finish().map(drop)
    }

    /// Closes the writer and returns the finished backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WriterClosed`] if the writer was already closed,
    /// or any error [`close`](Self::close) returns.
    pub fn close_into_backend(mut self) -> CoreResult<B> {
        self.finish()?.ok_or(CoreError::WriterClosed)
    }

    fn ensure_open(&self) -> CoreResult<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Closed => Err(CoreError::WriterClosed),
            WriterState::Failed => Err(CoreError::WriterFailed),
        }
    }

    fn finish(&mut self) -> CoreResult<Option<B>> {
        match self.state {
            WriterState::Open => {}
            WriterState::Closed => return Ok(None),
            WriterState::Failed => return Err(CoreError::WriterFailed),
        }

        self.pending
            .extend_from_slice(&encode_end_frame(self.records_written));
        self.flush_pending()?;

        let Some(mut backend) = self.backend.take() else {
            return Err(self.fail(CoreError::WriterClosed));
        };
        let synced = backend.flush().and_then(|()| {
            if self.config.sync_on_close {
                backend.sync()
            } else {
                Ok(())
            }
        });
        if let Err(e) = synced {
            return Err(self.fail(e.into()));
        }

        self.state = WriterState::Closed;
        debug!(
            "Closed container {:?} with {} records",
            self.path, self.records_written
        );
        Ok(Some(backend))
    }

    fn flush_pending(&mut self) -> CoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let Some(backend) = self.backend.as_mut() else {
            return Err(CoreError::WriterClosed);
        };
        match backend.append(&self.pending) {
            Ok(_) => {
                trace!("Appended {} buffered bytes", self.pending.len());
                self.pending.clear();
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Marks the writer failed and releases the backend without an end
    /// frame.
    fn fail(&mut self, err: CoreError) -> CoreError {
        warn!(
            "Container writer {:?} failed after {} records: {}",
            self.path, self.records_written, err
        );
        self.state = WriterState::Failed;
        self.pending.clear();
        self.backend = None;
        err
    }
}

impl<B: StorageBackend> Drop for ContainerWriter<B> {
    fn drop(&mut self) {
        if self.state == WriterState::Open {
            warn!(
                "Container writer {:?} dropped without close after {} records",
                self.path, self.records_written
            );
            if let Err(e) = self.close() {
                warn!("Best-effort close of {:?} failed: {}", self.path, e);
            }
        }
    }
}

impl<B: StorageBackend> std::fmt::Debug for ContainerWriter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("path", &self.path)
            .field("schema", &self.schema().full_name())
            .field("state", &self.state)
            .field("records_written", &self.records_written)
            .field("pending", &self.pending.len())
            .finish()
    }
}
