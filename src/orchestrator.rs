//! Top-level orchestration (C8): configuration and the entry point that
//! wires format-description decoding, scanning, and emission together.
//! Grounded on the teacher's `BinlogFileParserBuilder` (a config struct with
//! sane defaults feeding a single `run`-style entry point) and
//! `binlog_undo.cc`'s `main`.

use std::io::Write;

use crate::emitter;
use crate::errors::Error;
use crate::format_description::FormatDescription;
use crate::header::{TypeCode, HEADER_LEN};
use crate::io::{EventReader, PositionedRead};
use crate::scanner;

/// Tunable limits and policy switches for a single undo run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on a single event's `data_written`, guarding the scratch
    /// buffer against a corrupt or hostile length field. Default 1 GiB.
    pub max_event_size: u32,
    /// Upper bound on a table-map event's size specifically, tighter than
    /// `max_event_size` since a legitimate table-map is always small.
    /// Default 64 KiB.
    pub max_table_map_size: u32,
    /// Verify each input event's trailing CRC32 before trusting its bytes.
    /// Default `true`.
    pub verify_input_checksums: bool,
    /// Patch every emitted event's `log_pos` (and recompute its checksum)
    /// to match the compensating file's own layout, rather than copying
    /// the input's positions verbatim. Default `true`.
    pub rewrite_log_pos: bool,
    /// Reject an UPDATE row event whose column count doesn't match its
    /// table-map, instead of silently skipping the inversion. Default
    /// `false`, matching the original tool's silent-skip behavior.
    pub strict_column_count: bool,
    /// Require both of an UPDATE row event's column-presence bitmaps to be
    /// entirely 1s, instead of honoring partial presence via a
    /// population-count-sized null bitmap. Default `false`.
    pub strict_column_presence: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_event_size: 1 << 30,
            max_table_map_size: 64 * 1024,
            verify_input_checksums: true,
            rewrite_log_pos: true,
            strict_column_count: false,
            strict_column_presence: false,
        }
    }
}

/// Read a binlog from `input`, build its compensating (undo) binlog, and
/// write it to `output`.
pub fn run<R: PositionedRead, W: Write>(input: R, output: &mut W, config: &Config) -> Result<(), Error> {
    let mut event_reader = EventReader::new(input, config.max_event_size);

    let mut magic = [0u8; 4];
    event_reader.reader_mut().read_at(0, &mut magic)?;
    if magic != emitter::MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let fde_header = event_reader
        .read_event(4, config.max_event_size)?
        .ok_or(Error::MissingFormatDescription)?;
    if fde_header.type_code != TypeCode::FormatDescriptionEvent {
        return Err(Error::MissingFormatDescription);
    }
    // the FDE's body carries its own checksum algorithm byte in its final
    // 5 bytes regardless of whether checksums are enabled for the file, so
    // it is decoded without subtracting a checksum length first.
    let fde_body = &event_reader.event_bytes(&fde_header)[HEADER_LEN..];
    let fde = FormatDescription::decode(fde_body)?;

    let start_offset = 4 + fde_header.data_written as u64;
    log::info!(
        "scanning from offset {} (binlog version {}, checksum {:?})",
        start_offset,
        fde.binlog_version,
        fde.checksum_algorithm
    );

    let transactions = scanner::scan(&mut event_reader, start_offset, &fde, config)?;
    log::info!("found {} committed transaction(s)", transactions.len());

    let header_prefix_len = start_offset as usize;
    let mut header_prefix = vec![0u8; header_prefix_len];
    event_reader.reader_mut().read_at(0, &mut header_prefix)?;

    emitter::emit(&mut event_reader, output, &header_prefix, &transactions, &fde, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;
    use crate::testutil::*;

    #[test]
    fn test_run_end_to_end_single_write() {
        let (bytes, _fde) = build_single_write_log();
        let cursor = std::io::Cursor::new(bytes);
        let mut out = Vec::new();
        let config = Config::default();
        run(cursor, &mut out, &config).unwrap();
        assert_eq!(&out[..4], &emitter::MAGIC);
    }

    #[test]
    fn test_run_rejects_bad_magic() {
        let cursor = std::io::Cursor::new(vec![0u8; 64]);
        let mut out = Vec::new();
        let err = run(cursor, &mut out, &Config::default()).unwrap_err();
        match err {
            Error::BadMagic(_) => {}
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_run_two_transactions_reverses_commit_order() {
        let (bytes, _fde) = build_two_write_transactions();
        let cursor = std::io::Cursor::new(bytes);
        let mut out = Vec::new();
        run(cursor, &mut out, &Config::default()).unwrap();
        assert_eq!(&out[..4], &emitter::MAGIC);
        assert!(out.len() > 4);
    }

    #[test]
    fn test_run_delete_becomes_write() {
        let (bytes, fde) = build_single_delete_log();
        let cursor = std::io::Cursor::new(bytes);
        let mut out = Vec::new();
        run(cursor, &mut out, &Config::default()).unwrap();

        let prefix_len = HEADER_LEN + 4 + fde_len(&fde) as usize;
        let begin_header = crate::header::Header::decode(
            <&[u8; HEADER_LEN]>::try_from(&out[prefix_len..prefix_len + HEADER_LEN]).unwrap(),
        );
        let table_map_offset = prefix_len + begin_header.data_written as usize;
        let tm_header = crate::header::Header::decode(
            <&[u8; HEADER_LEN]>::try_from(&out[table_map_offset..table_map_offset + HEADER_LEN]).unwrap(),
        );
        let row_offset = table_map_offset + tm_header.data_written as usize;
        assert_eq!(out[row_offset + 4], TypeCode::WriteRowsEventV2.to_byte());
    }

    #[test]
    fn test_run_rejects_corrupt_position_and_writes_nothing_further() {
        let (mut bytes, fde) = build_single_write_log();
        let start = HEADER_LEN + 4 + fde_len(&fde) as usize;
        // corrupt the BEGIN event's log_pos field (offset 13..17 within its header)
        let bad_pos = (start as u32) + 999;
        bytes[start + 13..start + 17].copy_from_slice(&bad_pos.to_le_bytes());
        let cursor = std::io::Cursor::new(bytes);
        let mut out = Vec::new();
        let err = run(cursor, &mut out, &Config::default()).unwrap_err();
        match err {
            Error::CorruptEvent { .. } => {}
            other => panic!("expected CorruptEvent, got {:?}", other),
        }
        assert!(out.is_empty());
    }
}
