//! On-disk container layout.
//!
//! ```text
//! header: | magic "RECF" (4) | version u16 (2) | flags u16 (2) | schema_len u32 (4) | schema JSON | crc32 (4) |
//! record: | tag 0x01 (1) | payload_len u32 (4) | payload | crc32 (4) |
//! end:    | tag 0xFF (1) | record_count u64 (8) | crc32 (4) |
//! ```
//!
//! All integers are little-endian. Each CRC32 covers the preceding bytes of
//! its own frame.

use crate::error::{CoreError, CoreResult};
use crc32fast::Hasher;
use recfile_codec::Schema;

/// Container magic bytes.
pub const MAGIC: [u8; 4] = *b"RECF";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Fixed part of the header: magic (4) + version (2) + flags (2) + schema length (4).
pub const HEADER_PREFIX_LEN: usize = 12;

/// Record frame header: tag (1) + payload length (4).
pub const FRAME_HEADER_LEN: usize = 5;

/// End frame: tag (1) + record count (8) + crc (4).
pub const END_FRAME_LEN: usize = 13;

/// CRC size.
pub const CRC_SIZE: usize = 4;

/// Upper bound on the embedded schema description.
pub const MAX_SCHEMA_LEN: u32 = 1024 * 1024;

/// Frame tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameTag {
    /// One encoded record.
    Record = 0x01,
    /// End of container.
    End = 0xFF,
}

impl FrameTag {
    /// Converts from byte representation.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Record),
            0xFF => Some(Self::End),
            _ => None,
        }
    }

    /// Returns the byte representation.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Computes the CRC32 (IEEE) checksum of `data`.
#[must_use]
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Checks the trailing CRC of `frame` against the bytes before it.
pub(crate) fn verify_frame_checksum(frame: &[u8]) -> CoreResult<()> {
    let split = frame.len() - CRC_SIZE;
    let expected = read_u32(&frame[split..]);
    let actual = compute_checksum(&frame[..split]);
    if expected != actual {
        return Err(CoreError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

/// Encodes the container header embedding `schema`.
///
/// # Errors
///
/// Returns an error if the schema cannot be rendered or its description
/// exceeds [`MAX_SCHEMA_LEN`].
pub fn encode_header(schema: &Schema) -> CoreResult<Vec<u8>> {
    let json = schema.to_json()?;
    let schema_len = u32::try_from(json.len())
        .ok()
        .filter(|len| *len <= MAX_SCHEMA_LEN)
        .ok_or_else(|| {
            CoreError::invalid_operation(format!(
                "schema description of {} bytes exceeds {MAX_SCHEMA_LEN}",
                json.len()
            ))
        })?;

    let mut data = Vec::with_capacity(HEADER_PREFIX_LEN + json.len() + CRC_SIZE);
    data.extend_from_slice(&MAGIC);
    data.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&schema_len.to_le_bytes());
    data.extend_from_slice(json.as_bytes());

    let crc = compute_checksum(&data);
    data.extend_from_slice(&crc.to_le_bytes());
    Ok(data)
}

/// Validates the fixed header prefix and returns the schema length.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFormat`] for a wrong magic, an unsupported
/// version, unknown flags or an oversized schema.
pub fn parse_header_prefix(prefix: &[u8]) -> CoreResult<u32> {
    if prefix.len() < HEADER_PREFIX_LEN {
        return Err(CoreError::invalid_format(format!(
            "header needs {HEADER_PREFIX_LEN} bytes, found {}",
            prefix.len()
        )));
    }

    if prefix[0..4] != MAGIC {
        return Err(CoreError::invalid_format("invalid magic"));
    }

    let version = u16::from_le_bytes([prefix[4], prefix[5]]);
    if version == 0 || version > FORMAT_VERSION {
        return Err(CoreError::invalid_format(format!(
            "unsupported version {version}"
        )));
    }

    let flags = u16::from_le_bytes([prefix[6], prefix[7]]);
    if flags != 0 {
        return Err(CoreError::invalid_format(format!(
            "unknown header flags {flags:#06x}"
        )));
    }

    let schema_len = read_u32(&prefix[8..12]);
    if schema_len > MAX_SCHEMA_LEN {
        return Err(CoreError::invalid_format(format!(
            "schema length {schema_len} exceeds {MAX_SCHEMA_LEN}"
        )));
    }
    Ok(schema_len)
}

/// Appends a record frame around `payload` to `out`.
pub(crate) fn encode_record_frame(payload: &[u8], len: u32, out: &mut Vec<u8>) {
    let start = out.len();
    out.reserve(FRAME_HEADER_LEN + payload.len() + CRC_SIZE);
    out.push(FrameTag::Record.as_byte());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    let crc = compute_checksum(&out[start..]);
    out.extend_from_slice(&crc.to_le_bytes());
}

/// Encodes the end frame for a container of `record_count` records.
#[must_use]
pub fn encode_end_frame(record_count: u64) -> [u8; END_FRAME_LEN] {
    let mut frame = [0u8; END_FRAME_LEN];
    frame[0] = FrameTag::End.as_byte();
    frame[1..9].copy_from_slice(&record_count.to_le_bytes());
    let crc = compute_checksum(&frame[..9]);
    frame[9..].copy_from_slice(&crc.to_le_bytes());
    frame
}

/// Parses an end frame, returning the record count.
///
/// Returns `None` if `frame` is not an intact end frame.
#[must_use]
pub fn parse_end_frame(frame: &[u8]) -> Option<u64> {
    if frame.len() != END_FRAME_LEN || FrameTag::from_byte(frame[0]) != Some(FrameTag::End) {
        return None;
    }
    verify_frame_checksum(frame).ok()?;
    let mut count = [0u8; 8];
    count.copy_from_slice(&frame[1..9]);
    Some(u64::from_le_bytes(count))
}

pub(crate) fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
