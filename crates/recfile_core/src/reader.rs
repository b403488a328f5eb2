//! Container reader.
//!
//! Reads frames sequentially through a bounded read buffer, so memory stays
//! proportional to the largest record rather than the container size.

use crate::config::ContainerConfig;
use crate::error::{CoreError, CoreResult};
use crate::format::{
    parse_end_frame, parse_header_prefix, read_u32, verify_frame_checksum, FrameTag, CRC_SIZE,
    END_FRAME_LEN, FRAME_HEADER_LEN, HEADER_PREFIX_LEN,
};
use recfile_codec::{Record, RecordDecoder, Schema};
use recfile_storage::{FileBackend, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Lifecycle of a [`ContainerReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Records may remain.
    Reading,
    /// The end frame was reached or the container proved corrupt.
    Exhausted,
}

/// Reads records from a container in append order.
///
/// Opening validates the header and the end frame at the tail, so a
/// container whose writer never closed fails immediately with
/// [`CoreError::Truncated`]. Each record frame is checksummed and decoded
/// as it is read.
///
/// With a projection, fields outside the projection schema come back unset
/// in records that still carry the container's own schema.
///
/// # Example
///
/// ```no_run
/// use recfile_core::ContainerReader;
/// use std::path::Path;
///
/// let mut reader = ContainerReader::open(Path::new("rows.recf")).unwrap();
/// while reader.has_next() {
///     let record = reader.next_record().unwrap();
///     println!("{record}");
/// }
/// ```
pub struct ContainerReader {
    backend: Box<dyn StorageBackend>,
    path: Option<PathBuf>,
    decoder: RecordDecoder,
    state: ReaderState,
    header_len: u64,
    /// Offset of the end frame; record frames lie before it.
    end_offset: u64,
    /// Record count stored in the end frame.
    expected_records: u64,
    /// Absolute offset of `buffer[buffer_pos]`.
    offset: u64,
    buffer: Vec<u8>,
    buffer_pos: usize,
    buffer_len: usize,
    records_read: u64,
    payload_bytes: u64,
}

impl ContainerReader {
    /// Opens a container file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file is missing or locked by a
    /// writer, or a format error if the header or end frame is invalid.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_file(path, None, ContainerConfig::default())
    }

    /// Opens a container file, materializing only the fields of
    /// `projection`.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus [`CoreError::SchemaMismatch`] if
    /// `projection` is not an ordered subset of the embedded schema.
    pub fn open_with_projection(path: &Path, projection: &Schema) -> CoreResult<Self> {
        Self::open_file(path, Some(projection), ContainerConfig::default())
    }

    /// Opens a container file with a custom configuration and optional
    /// projection.
    ///
    /// # Errors
    ///
    /// See [`open_with_projection`](Self::open_with_projection).
    pub fn open_with_config(
        path: &Path,
        projection: Option<&Schema>,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        Self::open_file(path, projection, config)
    }

    fn open_file(
        path: &Path,
        projection: Option<&Schema>,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        let backend = FileBackend::open_read_only(path)?;
        let mut reader = Self::init(Box::new(backend), projection, &config)?;
        reader.path = Some(path.to_path_buf());
        debug!(
            "Opened container {:?}: schema {}, {} records",
            path,
            reader.schema().full_name(),
            reader.expected_records
        );
        Ok(reader)
    }

    /// Opens a container held by `backend`.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn from_backend(
        backend: Box<dyn StorageBackend>,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        Self::init(backend, None, &config)
    }

    /// Opens a container held by `backend` with a projection.
    ///
    /// # Errors
    ///
    /// See [`open_with_projection`](Self::open_with_projection).
    pub fn from_backend_with_projection(
        backend: Box<dyn StorageBackend>,
        projection: &Schema,
        config: ContainerConfig,
    ) -> CoreResult<Self> {
        Self::init(backend, Some(projection), &config)
    }

    fn init(
        backend: Box<dyn StorageBackend>,
        projection: Option<&Schema>,
        config: &ContainerConfig,
    ) -> CoreResult<Self> {
        let total_size = backend.size()?;
        if total_size < HEADER_PREFIX_LEN as u64 {
            return Err(CoreError::invalid_format(format!(
                "container of {total_size} bytes is shorter than a header"
            )));
        }

        let prefix = backend.read_at(0, HEADER_PREFIX_LEN)?;
        let schema_len = parse_header_prefix(&prefix)? as usize;
        let header_len = (HEADER_PREFIX_LEN + schema_len + CRC_SIZE) as u64;
        if total_size < header_len {
            return Err(CoreError::truncated(format!(
                "header needs {header_len} bytes, container has {total_size}"
            )));
        }

        let header = backend.read_at(0, header_len as usize)?;
        verify_frame_checksum(&header)?;
        let json = std::str::from_utf8(&header[HEADER_PREFIX_LEN..HEADER_PREFIX_LEN + schema_len])
            .map_err(|_| CoreError::invalid_format("embedded schema is not UTF-8"))?;
        let schema = Arc::new(Schema::parse(json)?);

        let end_offset = total_size
            .checked_sub(END_FRAME_LEN as u64)
            .filter(|offset| *offset >= header_len)
            .ok_or_else(|| CoreError::truncated("missing end frame"))?;
        let tail = backend.read_at(end_offset, END_FRAME_LEN)?;
        let expected_records = parse_end_frame(&tail)
            .ok_or_else(|| CoreError::truncated("missing or damaged end frame"))?;

        let decoder = match projection {
            Some(projection) => RecordDecoder::with_projection(schema, projection)?,
            None => RecordDecoder::new(schema),
        };

        Ok(Self {
            backend,
            path: None,
            decoder,
            state: ReaderState::Reading,
            header_len,
            end_offset,
            expected_records,
            offset: header_len,
            buffer: vec![0u8; config.read_buffer_size],
            buffer_pos: 0,
            buffer_len: 0,
            records_read: 0,
            payload_bytes: 0,
        })
    }

    /// Returns the schema embedded in the container.
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        self.decoder.schema()
    }

    /// Returns the reader state.
    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Returns the number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Returns the record count declared by the end frame.
    #[must_use]
    pub fn expected_records(&self) -> u64 {
        self.expected_records
    }

    /// Returns the header length in bytes.
    #[must_use]
    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    /// Returns the total payload bytes of the records read so far.
    #[must_use]
    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// Returns the total container size in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.end_offset + END_FRAME_LEN as u64
    }

    /// Returns `true` if [`next_record`](Self::next_record) will yield a
    /// record (or report corruption) rather than end-of-stream.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.state == ReaderState::Reading
            && (self.offset < self.end_offset || self.records_read != self.expected_records)
    }

    /// Reads the next record.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EndOfStream`] once every record has been read
    /// - [`CoreError::ChecksumMismatch`] or [`CoreError::InvalidFormat`] for
    ///   a damaged frame
    /// - codec errors for a payload that does not match the schema
    ///
    /// Any error other than end-of-stream exhausts the reader.
    pub fn next_record(&mut self) -> CoreResult<Record> {
        if !self.has_next() {
            self.state = ReaderState::Exhausted;
            return Err(CoreError::EndOfStream);
        }

        match self.read_frame() {
            Ok(record) => {
                if self.offset >= self.end_offset && self.records_read == self.expected_records {
                    trace!("Reached end frame after {} records", self.records_read);
                    self.state = ReaderState::Exhausted;
                }
                Ok(record)
            }
            Err(e) => {
                self.state = ReaderState::Exhausted;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self) -> CoreResult<Record> {
        let frame_offset = self.offset;

        if frame_offset >= self.end_offset {
            return Err(CoreError::invalid_format(format!(
                "end frame declares {} records but {} were found",
                self.expected_records, self.records_read
            )));
        }

        if self.records_read == self.expected_records {
            return Err(CoreError::invalid_format(format!(
                "record frame at offset {frame_offset} beyond the {} declared records",
                self.expected_records
            )));
        }

        if !self.ensure_buffered(FRAME_HEADER_LEN)? {
            return Err(CoreError::invalid_format(format!(
                "incomplete frame header at offset {frame_offset}"
            )));
        }

        let header = &self.buffer[self.buffer_pos..self.buffer_pos + FRAME_HEADER_LEN];
        match FrameTag::from_byte(header[0]) {
            Some(FrameTag::Record) => {}
            Some(FrameTag::End) => {
                return Err(CoreError::invalid_format(format!(
                    "end frame at offset {frame_offset} is followed by more data"
                )));
            }
            None => {
                return Err(CoreError::invalid_format(format!(
                    "unknown frame tag {:#04x} at offset {frame_offset}",
                    header[0]
                )));
            }
        }

        let payload_len = read_u32(&header[1..]);
        let frame_len = (FRAME_HEADER_LEN + CRC_SIZE) as u64 + u64::from(payload_len);
        if frame_len > self.end_offset - frame_offset {
            return Err(CoreError::invalid_format(format!(
                "frame at offset {frame_offset} of {frame_len} bytes overruns the end frame"
            )));
        }

        let frame_len = frame_len as usize;
        if !self.ensure_buffered(frame_len)? {
            return Err(CoreError::invalid_format(format!(
                "frame at offset {frame_offset} overruns the end frame"
            )));
        }

        let frame = &self.buffer[self.buffer_pos..self.buffer_pos + frame_len];
        verify_frame_checksum(frame)?;
        let payload = &frame[FRAME_HEADER_LEN..FRAME_HEADER_LEN + payload_len as usize];
        let record = self.decoder.decode(payload)?;

        self.buffer_pos += frame_len;
        self.offset += frame_len as u64;
        self.records_read += 1;
        self.payload_bytes += u64::from(payload_len);
        trace!(
            "Read record {} at offset {} ({} bytes)",
            self.records_read,
            frame_offset,
            payload_len
        );
        Ok(record)
    }

    /// Ensures at least `min_bytes` are buffered from the current offset.
    ///
    /// Returns `false` if fewer than `min_bytes` remain before the end frame.
    /// The buffer grows when a frame is larger than it.
    fn ensure_buffered(&mut self, min_bytes: usize) -> CoreResult<bool> {
        let available = self.buffer_len - self.buffer_pos;
        if available >= min_bytes {
            return Ok(true);
        }

        let unread = self.end_offset - self.offset;
        if unread < min_bytes as u64 {
            return Ok(false);
        }

        if self.buffer_pos > 0 && available > 0 {
            self.buffer.copy_within(self.buffer_pos..self.buffer_len, 0);
        }
        self.buffer_len = available;
        self.buffer_pos = 0;

        if min_bytes > self.buffer.len() {
            self.buffer.resize(min_bytes.next_power_of_two(), 0);
        }

        let room = (self.buffer.len() - self.buffer_len) as u64;
        let to_read = room.min(unread - available as u64) as usize;
        if to_read > 0 {
            let data = self
                .backend
                .read_at(self.offset + available as u64, to_read)?;
            self.buffer[self.buffer_len..self.buffer_len + data.len()].copy_from_slice(&data);
            self.buffer_len += data.len();
        }

        Ok(self.buffer_len - self.buffer_pos >= min_bytes)
    }
}

impl Iterator for ContainerReader {
    type Item = CoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_record())
        } else {
            None
        }
    }
}

impl std::fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("path", &self.path)
            .field("schema", &self.schema().full_name())
            .field("state", &self.state)
            .field("records_read", &self.records_read)
            .field("expected_records", &self.expected_records)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::encode_header;
    use crate::writer::ContainerWriter;
    use recfile_codec::FieldType;
    use recfile_storage::InMemoryBackend;

    fn num_str() -> Arc<Schema> {
        Arc::new(
            Schema::builder("NumStr")
                .field("num", FieldType::Int32)
                .field("str", FieldType::String)
                .build()
                .unwrap(),
        )
    }

    fn write_container(nums: &[i32], config: ContainerConfig) -> Vec<u8> {
        let schema = num_str();
        let mut writer =
            ContainerWriter::from_backend(InMemoryBackend::new(), schema.clone(), config).unwrap();
        for n in nums {
            let record = Record::new(schema.clone())
                .with("num", *n)
                .unwrap()
                .with("str", format!("value-{n}"))
                .unwrap();
            writer.append(&record).unwrap();
        }
        writer.close_into_backend().unwrap().into_data()
    }

    fn reader_over(bytes: Vec<u8>) -> CoreResult<ContainerReader> {
        ContainerReader::from_backend(
            Box::new(InMemoryBackend::with_data(bytes)),
            ContainerConfig::default(),
        )
    }

    fn nums(reader: ContainerReader) -> Vec<i32> {
        reader
            .map(|r| r.unwrap().get_int32("num").unwrap().unwrap())
            .collect()
    }

    #[test]
    fn records_come_back_in_append_order() {
        let order = [1, 3, 5, 7, 9, 0, 2, 4, 6, 8, 10];
        let reader = reader_over(write_container(&order, ContainerConfig::default())).unwrap();
        assert_eq!(reader.expected_records(), 11);
        assert_eq!(nums(reader), order.to_vec());
    }

    #[test]
    fn exhausted_reader_reports_end_of_stream() {
        let mut reader = reader_over(write_container(&[1, 2], ContainerConfig::default())).unwrap();
        assert!(reader.has_next());
        reader.next_record().unwrap();
        reader.next_record().unwrap();

        assert!(!reader.has_next());
        assert_eq!(reader.state(), ReaderState::Exhausted);
        assert!(reader.next_record().unwrap_err().is_end_of_stream());
        assert!(reader.next_record().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn empty_container() {
        let mut reader = reader_over(write_container(&[], ContainerConfig::default())).unwrap();
        assert!(!reader.has_next());
        assert!(reader.next_record().unwrap_err().is_end_of_stream());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn small_read_buffer_grows_for_large_frames() {
        let bytes = write_container(&[1, -1, i32::MAX, i32::MIN], ContainerConfig::default());
        let reader = ContainerReader::from_backend(
            Box::new(InMemoryBackend::with_data(bytes)),
            ContainerConfig::new().read_buffer_size(4),
        )
        .unwrap();
        assert_eq!(nums(reader), vec![1, -1, i32::MAX, i32::MIN]);
    }

    #[test]
    fn projection_leaves_excluded_fields_unset() {
        let bytes = write_container(&(0..=10).collect::<Vec<_>>(), ContainerConfig::default());
        let projection = Schema::builder("NumStr")
            .field("num", FieldType::Int32)
            .build()
            .unwrap();
        let reader = ContainerReader::from_backend_with_projection(
            Box::new(InMemoryBackend::with_data(bytes)),
            &projection,
            ContainerConfig::default(),
        )
        .unwrap();

        let mut expected = 0;
        for record in reader {
            let record = record.unwrap();
            assert_eq!(record.get_int32("num").unwrap(), Some(expected));
            assert_eq!(record.get_str("str").unwrap(), None);
            expected += 1;
        }
        assert_eq!(expected, 11);
    }

    #[test]
    fn projection_with_foreign_field_fails() {
        let bytes = write_container(&[1], ContainerConfig::default());
        let projection = Schema::builder("NumStr")
            .field("missing", FieldType::Int32)
            .build()
            .unwrap();
        let err = ContainerReader::from_backend_with_projection(
            Box::new(InMemoryBackend::with_data(bytes)),
            &projection,
            ContainerConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn unclosed_container_is_truncated() {
        let mut bytes = write_container(&[1, 2, 3], ContainerConfig::default());
        bytes.truncate(bytes.len() - END_FRAME_LEN);
        assert!(matches!(reader_over(bytes), Err(CoreError::Truncated { .. })));
    }

    #[test]
    fn header_only_container_is_truncated() {
        let header = encode_header(&num_str()).unwrap();
        assert!(matches!(reader_over(header), Err(CoreError::Truncated { .. })));
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = write_container(&[1], ContainerConfig::default());
        bytes[0] = b'Z';
        assert!(matches!(reader_over(bytes), Err(CoreError::InvalidFormat { .. })));
        assert!(matches!(
            reader_over(b"RE".to_vec()),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn corrupted_header_fails_checksum() {
        let mut bytes = write_container(&[1], ContainerConfig::default());
        // Flip a byte inside the schema JSON.
        bytes[HEADER_PREFIX_LEN + 2] ^= 0x20;
        assert!(matches!(
            reader_over(bytes),
            Err(CoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn corrupted_record_fails_checksum_and_exhausts() {
        let mut bytes = write_container(&[1, 2], ContainerConfig::default());
        let header_len = encode_header(&num_str()).unwrap().len();
        bytes[header_len + FRAME_HEADER_LEN] ^= 0x01;

        let mut reader = reader_over(bytes).unwrap();
        assert!(matches!(
            reader.next_record(),
            Err(CoreError::ChecksumMismatch { .. })
        ));
        assert!(!reader.has_next());
        assert!(reader.next_record().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut bytes = write_container(&[1], ContainerConfig::default());
        let header_len = encode_header(&num_str()).unwrap().len();
        bytes[header_len] = 0x07;

        let err = reader_over(bytes).unwrap().next_record().unwrap_err();
        assert!(err.to_string().contains("unknown frame tag 0x07"));
    }

    #[test]
    fn count_mismatch_detected() {
        let bytes = write_container(&[1, 2], ContainerConfig::default());
        let mut forged = bytes[..bytes.len() - END_FRAME_LEN].to_vec();
        forged.extend_from_slice(&crate::format::encode_end_frame(3));

        let mut reader = reader_over(forged).unwrap();
        reader.next_record().unwrap();
        reader.next_record().unwrap();
        assert!(reader.has_next());
        assert!(matches!(
            reader.next_record(),
            Err(CoreError::InvalidFormat { .. })
        ));
        assert!(!reader.has_next());
    }

    #[test]
    fn fewer_declared_records_detected() {
        let bytes = write_container(&[1, 2], ContainerConfig::default());
        let mut forged = bytes[..bytes.len() - END_FRAME_LEN].to_vec();
        forged.extend_from_slice(&crate::format::encode_end_frame(1));

        let mut reader = reader_over(forged).unwrap();
        reader.next_record().unwrap();
        assert!(reader.has_next());
        assert!(matches!(
            reader.next_record(),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn data_after_end_frame_detected() {
        let first = write_container(&[1], ContainerConfig::default());
        let mut forged = first.clone();
        // A second end frame makes the original one appear mid-stream.
        forged.extend_from_slice(&crate::format::encode_end_frame(1));

        let mut reader = reader_over(forged).unwrap();
        reader.next_record().unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn forged_length_overruns_end_frame() {
        let mut bytes = write_container(&[1], ContainerConfig::default());
        let header_len = encode_header(&num_str()).unwrap().len();
        bytes[header_len + 1..header_len + 5].copy_from_slice(&u32::MAX.to_le_bytes());

        let mut reader = reader_over(bytes).unwrap();
        let err = reader.next_record().unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
        assert!(err.to_string().contains("overruns the end frame"));
        assert_eq!(reader.state(), ReaderState::Exhausted);
    }

    #[test]
    fn read_ignores_writer_record_limit() {
        let tight = ContainerConfig::new().max_record_size(2);
        let bytes = write_container(&[1, 2], ContainerConfig::default());
        let reader =
            ContainerReader::from_backend(Box::new(InMemoryBackend::with_data(bytes)), tight)
                .unwrap();
        assert_eq!(nums(reader), vec![1, 2]);
    }

    #[test]
    fn file_roundtrip_and_reader_locking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.recf");
        let schema = Arc::new(
            Schema::parse(
                r#"{"name":"Pair","fields":[{"name":"left","type":"string"},{"name":"right","type":"string"}]}"#,
            )
            .unwrap(),
        );

        let mut writer = ContainerWriter::create(&path, schema.clone()).unwrap();
        assert!(ContainerReader::open(&path).is_err());

        let record = Record::new(schema)
            .with("left", "L")
            .unwrap()
            .with("right", "R")
            .unwrap();
        writer.append(&record).unwrap();
        writer.close().unwrap();

        let mut reader = ContainerReader::open(&path).unwrap();
        assert_eq!(reader.schema().name(), "Pair");
        let read = reader.next_record().unwrap();
        assert_eq!(read, record);
        assert!(!reader.has_next());
    }
}
