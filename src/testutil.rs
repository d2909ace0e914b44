//! Synthetic binlog construction for tests. No on-disk fixture binlog is
//! available to this crate, so tests build minimal, valid byte sequences
//! in memory instead.

use crate::checksum;
use crate::emitter::MAGIC;
use crate::format_description::{ChecksumAlgorithm, FormatDescription};
use crate::header::{Header, TypeCode, HEADER_LEN};

/// Number of body bytes in a format-description event, given how many
/// post-header-length table entries it carries.
pub fn fde_len(fde: &FormatDescription) -> u64 {
    (2 + 50 + 4 + 1 + fde.post_header_len.len() + 1 + 4) as u64
}

struct LogBuilder {
    bytes: Vec<u8>,
    offset: u64,
}

impl LogBuilder {
    fn new() -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        LogBuilder { bytes, offset: 4 }
    }

    /// Append one CRC32-checksummed event and advance the write cursor.
    fn push(&mut self, type_code: TypeCode, payload: &[u8]) {
        let data_written = (HEADER_LEN + payload.len() + 4) as u32;
        let header = Header {
            timestamp: 0,
            type_code,
            server_id: 1,
            data_written,
            log_pos: self.offset + data_written as u64,
            flags: 0,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.encode(&mut buf);
        self.bytes.extend_from_slice(&buf);
        self.bytes.extend_from_slice(payload);
        self.bytes.extend_from_slice(&[0u8; 4]);
        let event_start = self.offset as usize;
        checksum::rewrite_checksum(&mut self.bytes[event_start..]);
        self.offset += data_written as u64;
    }

    fn push_fde(&mut self) -> FormatDescription {
        let mut post_header_len = vec![0u8; 35];
        post_header_len[TypeCode::QueryEvent.to_byte() as usize - 1] = 13;
        post_header_len[TypeCode::TableMapEvent.to_byte() as usize - 1] = 8;
        post_header_len[TypeCode::WriteRowsEventV2.to_byte() as usize - 1] = 8;
        post_header_len[TypeCode::UpdateRowsEventV2.to_byte() as usize - 1] = 8;
        post_header_len[TypeCode::DeleteRowsEventV2.to_byte() as usize - 1] = 8;
        post_header_len[TypeCode::XidEvent.to_byte() as usize - 1] = 0;

        let mut payload = Vec::new();
        payload.extend_from_slice(&4u16.to_le_bytes());
        let mut version = [0u8; 50];
        version[..6].copy_from_slice(b"5.7.30");
        payload.extend_from_slice(&version);
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.push(19);
        payload.extend_from_slice(&post_header_len);
        payload.push(0x01); // checksum algorithm: CRC32

        self.push(TypeCode::FormatDescriptionEvent, &payload);
        FormatDescription {
            binlog_version: 4,
            server_version: "5.7.30".into(),
            create_timestamp: 0,
            common_header_len: 19,
            post_header_len,
            checksum_algorithm: ChecksumAlgorithm::Crc32,
        }
    }

    fn push_begin(&mut self) {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_le_bytes()); // thread_id
        payload.extend_from_slice(&0u32.to_le_bytes()); // exec_time
        payload.push(0); // schema_len
        payload.extend_from_slice(&0u16.to_le_bytes()); // error_code
        payload.extend_from_slice(&0u16.to_le_bytes()); // status_vars_len
        payload.push(0); // nul terminator after (empty) schema name
        payload.extend_from_slice(b"BEGIN");
        self.push(TypeCode::QueryEvent, &payload);
    }

    fn push_table_map(&mut self, table_id: u64) {
        let mut payload = Vec::new();
        payload.extend_from_slice(&table_id.to_le_bytes()[0..6]);
        payload.extend_from_slice(&[0u8, 0]); // reserved flags
        payload.push(2);
        payload.extend_from_slice(b"db");
        payload.push(0);
        payload.push(1);
        payload.extend_from_slice(b"t");
        payload.push(0);
        payload.push(1); // column count
        payload.push(1); // TINY
        self.push(TypeCode::TableMapEvent, &payload);
    }

    fn push_row(&mut self, type_code: TypeCode, value: u8) {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1u64.to_le_bytes()[0..6]); // table_id
        payload.extend_from_slice(&[0u8, 0]); // flags
        payload.push(1); // column count
        payload.push(0xff); // presence bitmap
        payload.push(0x00); // null bitmap
        payload.push(value); // TINY value
        self.push(type_code, &payload);
    }

    fn push_write_row(&mut self) {
        self.push_row(TypeCode::WriteRowsEventV2, 7);
    }

    fn push_delete_row(&mut self) {
        self.push_row(TypeCode::DeleteRowsEventV2, 7);
    }

    fn push_xid(&mut self) {
        self.push(TypeCode::XidEvent, &0u64.to_le_bytes());
    }

    fn push_transaction(&mut self) {
        self.push_begin();
        self.push_table_map(1);
        self.push_write_row();
        self.push_xid();
    }

    fn push_delete_transaction(&mut self) {
        self.push_begin();
        self.push_table_map(1);
        self.push_delete_row();
        self.push_xid();
    }

    /// A transaction with two table-map/row pairs: row A (value 1) written
    /// first, then row B (value 2), for ordering tests.
    fn push_two_row_transaction(&mut self) {
        self.push_begin();
        self.push_table_map(1);
        self.push_row(TypeCode::WriteRowsEventV2, 1);
        self.push_table_map(1);
        self.push_row(TypeCode::WriteRowsEventV2, 2);
        self.push_xid();
    }
}

/// A binlog with one BEGIN/table-map/WRITE_ROWS/XID transaction.
pub fn build_single_write_log() -> (Vec<u8>, FormatDescription) {
    let mut b = LogBuilder::new();
    let fde = b.push_fde();
    b.push_transaction();
    (b.bytes, fde)
}

/// A binlog with two back-to-back transactions, for ordering tests.
pub fn build_two_write_transactions() -> (Vec<u8>, FormatDescription) {
    let mut b = LogBuilder::new();
    let fde = b.push_fde();
    b.push_transaction();
    b.push_transaction();
    (b.bytes, fde)
}

/// A binlog with one BEGIN/table-map/DELETE_ROWS/XID transaction.
pub fn build_single_delete_log() -> (Vec<u8>, FormatDescription) {
    let mut b = LogBuilder::new();
    let fde = b.push_fde();
    b.push_delete_transaction();
    (b.bytes, fde)
}

/// A binlog with one transaction containing two row events, for testing
/// that row order is reversed within a transaction.
pub fn build_two_row_transaction_log() -> (Vec<u8>, FormatDescription) {
    let mut b = LogBuilder::new();
    let fde = b.push_fde();
    b.push_two_row_transaction();
    (b.bytes, fde)
}
