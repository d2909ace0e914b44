//! Format-description event (FDE) decoding: binlog version, per-event-type
//! post-header lengths, and the checksum algorithm used by every
//! subsequent event in the file.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::header::TypeCode;

const SERVER_VERSION_LEN: usize = 50;
/// Trailing bytes on every FDE: a one-byte checksum-algorithm indicator
/// followed by the FDE's own 4-byte checksum.
const FOOTER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    None,
    Crc32,
    Other(u8),
}

impl From<u8> for ChecksumAlgorithm {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => ChecksumAlgorithm::None,
            0x01 => ChecksumAlgorithm::Crc32,
            other => ChecksumAlgorithm::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormatDescription {
    pub binlog_version: u16,
    pub server_version: String,
    pub create_timestamp: u32,
    pub common_header_len: u8,
    pub post_header_len: Vec<u8>,
    pub checksum_algorithm: ChecksumAlgorithm,
}

impl FormatDescription {
    /// Decode an FDE's body (bytes following the 19-byte header, including
    /// its own trailing checksum bytes — the checksum algorithm indicator
    /// lives just before them).
    pub fn decode(body: &[u8]) -> io::Result<Self> {
        if body.len() < 2 + SERVER_VERSION_LEN + 4 + 1 + FOOTER_LEN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "format-description event body too short",
            ));
        }
        let mut cursor = Cursor::new(body);
        let binlog_version = cursor.read_u16::<LittleEndian>()?;
        let mut server_version_buf = [0u8; SERVER_VERSION_LEN];
        cursor.read_exact(&mut server_version_buf)?;
        let server_version = String::from_utf8_lossy(
            server_version_buf.split(|c| *c == 0x00).next().unwrap_or(&[]),
        )
        .into_owned();
        let create_timestamp = cursor.read_u32::<LittleEndian>()?;
        let common_header_len = cursor.read_u8()?;

        let post_header_table_len = body.len() - 2 - SERVER_VERSION_LEN - 4 - 1 - FOOTER_LEN;
        let mut post_header_len = vec![0u8; post_header_table_len];
        cursor.read_exact(&mut post_header_len)?;

        let checksum_algorithm = ChecksumAlgorithm::from(cursor.read_u8()?);

        Ok(FormatDescription {
            binlog_version,
            server_version,
            create_timestamp,
            common_header_len,
            post_header_len,
            checksum_algorithm,
        })
    }

    /// Post-header length for `type_code`, or `None` if the FDE's table
    /// doesn't cover it (an event type newer than this binlog's format).
    pub fn post_header_len_for(&self, type_code: TypeCode) -> Option<u8> {
        let idx = type_code.to_byte() as usize;
        if idx == 0 {
            return None;
        }
        self.post_header_len.get(idx - 1).copied()
    }

    pub fn checksum_enabled(&self) -> bool {
        self.checksum_algorithm == ChecksumAlgorithm::Crc32
    }
}
