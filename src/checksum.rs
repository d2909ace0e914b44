//! CRC32 checksum engine: the zlib/IEEE-802.3 polynomial MySQL binlogs use
//! for their trailing per-event checksum.
//!
//! Grounded on `jiangzhe-mybin/mybin-core/src/util.rs`'s `checksum_crc32`,
//! which uses the same `crc-any` crate for the same purpose.

use byteorder::{ByteOrder, LittleEndian};
use crc_any::CRCu32;

use crate::header::CHECKSUM_LEN;

/// CRC32 (IEEE / zlib variant) over `bytes`.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = CRCu32::crc32();
    hasher.digest(bytes);
    hasher.get_crc()
}

/// Recompute and rewrite the trailing 4-byte checksum of a complete,
/// in-memory event buffer (header + body + checksum slot). `event` must be
/// at least `CHECKSUM_LEN` bytes long.
pub fn rewrite_checksum(event: &mut [u8]) {
    let split = event.len() - CHECKSUM_LEN as usize;
    let checksum = crc32(&event[..split]);
    LittleEndian::write_u32(&mut event[split..], checksum);
}

/// Verify that `event`'s trailing 4 bytes match the CRC32 of everything
/// preceding them.
pub fn verify_checksum(event: &[u8]) -> bool {
    let split = event.len() - CHECKSUM_LEN as usize;
    let expected = LittleEndian::read_u32(&event[split..]);
    crc32(&event[..split]) == expected
}
