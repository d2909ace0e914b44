//! MySQL length-encoded integers: a variable-width unsigned integer encoding
//! (1, 3, 4, or 9 bytes, discriminated by the first byte).
//!
//! Grounded on the teacher's `packet_helpers::read_variable_length_integer`,
//! but reworked per design note: this takes a plain byte slice and returns
//! `(value, bytes_consumed)` instead of mutating an ambient `Read` cursor by
//! reference, so the row-event inverter can walk a slice view without
//! threading a `Cursor` through it.

use byteorder::{ByteOrder, LittleEndian};

/// Decode a length-encoded integer from the start of `buf`.
///
/// Returns `None` if `buf` is too short for the encoding its first byte
/// implies.
pub fn read_length_encoded_int(buf: &[u8]) -> Option<(u64, usize)> {
    let first = *buf.first()?;
    if first < 0xfb {
        Some((first as u64, 1))
    } else if first == 0xfc {
        if buf.len() < 3 {
            return None;
        }
        Some((LittleEndian::read_u16(&buf[1..3]) as u64, 3))
    } else if first == 0xfd {
        if buf.len() < 4 {
            return None;
        }
        let mut tmp = [0u8; 4];
        tmp[0..3].copy_from_slice(&buf[1..4]);
        Some((LittleEndian::read_u32(&tmp) as u64, 4))
    } else if first == 0xfe {
        if buf.len() < 9 {
            return None;
        }
        Some((LittleEndian::read_u64(&buf[1..9]), 9))
    } else {
        None
    }
}
