//! Compensating binlog emitter (C7): writes the magic bytes and
//! format-description event verbatim, then each transaction in reverse
//! commit order with its row events individually inverted and reversed.
//! Grounded on `binlog_undo.cc`'s `output`.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum;
use crate::errors::Error;
use crate::format_description::FormatDescription;
use crate::header::HEADER_LEN;
use crate::inverter::invert_row_event;
use crate::io::{EventReader, PositionedRead};
use crate::orchestrator::Config;
use crate::scanner::Transaction;
use crate::table_map::TableMap;

/// The 4 magic bytes every binlog file begins with.
pub const MAGIC: [u8; 4] = [0xfe, 0x62, 0x69, 0x6e];

/// Write the compensating binlog for `transactions` (assumed already in
/// scan/commit order) to `out`. `header_bytes` is the verbatim magic +
/// format-description prefix read from the input.
pub fn emit<R: PositionedRead, W: Write>(
    event_reader: &mut EventReader<R>,
    out: &mut W,
    header_prefix: &[u8],
    transactions: &[Transaction],
    fde: &FormatDescription,
    config: &Config,
) -> Result<(), Error> {
    let mut written: u64 = header_prefix.len() as u64;
    out.write_all(header_prefix)?;

    for transaction in transactions.iter().rev() {
        written = copy_verbatim(event_reader, out, transaction.begin.offset, fde, config, written)?;

        for table_map_ref in transaction.rows.iter().rev() {
            let table_map_header = event_reader
                .read_event(table_map_ref.offset, config.max_event_size)?
                .expect("table-map offset was already validated by the scanner");
            let table_map = TableMap::decode(event_reader.body(&table_map_header, fde.checksum_enabled()))?;
            written = copy_verbatim(event_reader, out, table_map_ref.offset, fde, config, written)?;

            let row_offset = table_map_ref.end();
            written = write_inverted_row(event_reader, out, row_offset, &table_map, fde, config, written)?;
        }

        written = copy_verbatim(event_reader, out, transaction.xid.offset, fde, config, written)?;
    }

    Ok(())
}

/// Copy one event unchanged from input to output, optionally rewriting its
/// `log_pos` (and, if checksummed, recomputing its checksum) to match the
/// compensating file's own layout.
fn copy_verbatim<R: PositionedRead, W: Write>(
    event_reader: &mut EventReader<R>,
    out: &mut W,
    offset: u64,
    fde: &FormatDescription,
    config: &Config,
    written: u64,
) -> Result<u64, Error> {
    let header = event_reader
        .read_event(offset, config.max_event_size)?
        .expect("offset was already validated by the scanner");
    let size = header.data_written as u64;
    let mut buf = event_reader.event_bytes(&header).to_vec();
    rewrite_position(&mut buf, written, config, fde.checksum_enabled());
    out.write_all(&buf)?;
    Ok(written + size)
}

/// Read the row event at `offset`, invert it, rewrite its position if
/// configured to, and write it out.
fn write_inverted_row<R: PositionedRead, W: Write>(
    event_reader: &mut EventReader<R>,
    out: &mut W,
    offset: u64,
    table_map: &TableMap,
    fde: &FormatDescription,
    config: &Config,
    written: u64,
) -> Result<u64, Error> {
    let mut header = event_reader
        .read_event(offset, config.max_event_size)?
        .expect("row offset was already validated by the scanner");
    let size = header.data_written as u64;
    let mut buf = event_reader.event_bytes(&header).to_vec();

    invert_row_event(&mut buf, &mut header, table_map, fde, config)?;
    rewrite_position(&mut buf, written, config, fde.checksum_enabled());

    out.write_all(&buf)?;
    Ok(written + size)
}

/// Patch `log_pos` to the event's new absolute offset in the output stream
/// and recompute its checksum, when `config.rewrite_log_pos` is set. Safe
/// to call unconditionally: the inverter's own checksum recompute becomes
/// stale the moment `log_pos` changes, so this always has the last word.
fn rewrite_position(buf: &mut [u8], written: u64, config: &Config, checksum_enabled: bool) {
    if !config.rewrite_log_pos {
        return;
    }
    let new_log_pos = written + buf.len() as u64;
    LittleEndian::write_u32(&mut buf[13..17], new_log_pos as u32);
    if checksum_enabled {
        checksum::rewrite_checksum(buf);
    }
}
