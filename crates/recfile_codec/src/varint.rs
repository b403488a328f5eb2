//! Zig-zag and LEB128 varint primitives.
//!
//! Integers are zig-zag mapped so small magnitudes of either sign stay
//! short, then written seven bits per byte, least significant group first,
//! with the high bit of each byte marking continuation.
//!
//! ```text
//!   0 -> 00        -1 -> 01        1 -> 02
//!  63 -> 7e       -64 -> 7f       64 -> 80 01
//! ```

use crate::error::{CodecError, CodecResult};

/// Maximum encoded length of a 32-bit varint.
pub const MAX_VARINT32_LEN: usize = 5;

/// Maps a signed integer onto an unsigned one, interleaving signs.
#[inline]
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn zigzag_encode(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag_encode`].
#[inline]
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn zigzag_decode(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Returns the number of bytes `value` occupies as a varint.
#[must_use]
pub const fn encoded_len(value: u32) -> usize {
    if value < (1 << 7) {
        1
    } else if value < (1 << 14) {
        2
    } else if value < (1 << 21) {
        3
    } else if value < (1 << 28) {
        4
    } else {
        5
    }
}

/// Appends `value` as a varint.
#[allow(clippy::cast_possible_truncation)]
pub fn write_u32(mut value: u32, into: &mut Vec<u8>) {
    while value >= 0x80 {
        into.push((value as u8) | 0x80);
        value >>= 7;
    }
    into.push(value as u8);
}

/// Reads a varint starting at `*pos`, advancing `*pos` past it.
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEof`] if the input ends mid-varint and
/// [`CodecError::VarintOverflow`] if it does not fit in `u32`.
pub fn read_u32(data: &[u8], pos: &mut usize) -> CodecResult<u32> {
    let mut result: u32 = 0;
    for i in 0..MAX_VARINT32_LEN {
        let byte = *data.get(*pos).ok_or(CodecError::UnexpectedEof)?;
        *pos += 1;

        if i == MAX_VARINT32_LEN - 1 && byte > 0x0f {
            // Only four payload bits remain in the fifth byte.
            return Err(CodecError::VarintOverflow);
        }

        result |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(CodecError::VarintOverflow)
}

/// Appends a zig-zag varint.
pub fn write_i32(value: i32, into: &mut Vec<u8>) {
    write_u32(zigzag_encode(value), into);
}

/// Reads a zig-zag varint.
///
/// # Errors
///
/// Same as [`read_u32`].
pub fn read_i32(data: &[u8], pos: &mut usize) -> CodecResult<i32> {
    read_u32(data, pos).map(zigzag_decode)
}
