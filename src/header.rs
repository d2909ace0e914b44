//! Fixed-size event header: decode, encode, and the position-chain invariant.

use byteorder::{ByteOrder, LittleEndian};

/// Size in bytes of the fixed event header (timestamp, type, server id,
/// data_written, log_pos, flags).
pub const HEADER_LEN: usize = 19;

/// Size in bytes of the trailing CRC32 checksum, when enabled.
pub const CHECKSUM_LEN: u32 = 4;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TypeCode {
    Unknown,
    StartEventV3,
    QueryEvent,
    StopEvent,
    RotateEvent,
    IntvarEvent,
    LoadEvent,
    SlaveEvent,
    CreateFileEvent,
    AppendBlockEvent,
    ExecLoadEvent,
    DeleteFileEvent,
    NewLoadEvent,
    RandEvent,
    UserVarEvent,
    FormatDescriptionEvent,
    XidEvent,
    BeginLoadQueryEvent,
    ExecuteLoadQueryEvent,
    TableMapEvent,
    PreGaWriteRowsEvent,
    PreGaUpdateRowsEvent,
    PreGaDeleteRowsEvent,
    WriteRowsEventV1,
    UpdateRowsEventV1,
    DeleteRowsEventV1,
    IncidentEvent,
    HeartbeatLogEvent,
    IgnorableLogEvent,
    RowsQueryLogEvent,
    WriteRowsEventV2,
    UpdateRowsEventV2,
    DeleteRowsEventV2,
    GtidLogEvent,
    AnonymousGtidLogEvent,
    PreviousGtidsLogEvent,
    OtherUnknown(u8),
}

impl TypeCode {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => TypeCode::Unknown,
            1 => TypeCode::StartEventV3,
            2 => TypeCode::QueryEvent,
            3 => TypeCode::StopEvent,
            4 => TypeCode::RotateEvent,
            5 => TypeCode::IntvarEvent,
            6 => TypeCode::LoadEvent,
            7 => TypeCode::SlaveEvent,
            8 => TypeCode::CreateFileEvent,
            9 => TypeCode::AppendBlockEvent,
            10 => TypeCode::ExecLoadEvent,
            11 => TypeCode::DeleteFileEvent,
            12 => TypeCode::NewLoadEvent,
            13 => TypeCode::RandEvent,
            14 => TypeCode::UserVarEvent,
            15 => TypeCode::FormatDescriptionEvent,
            16 => TypeCode::XidEvent,
            17 => TypeCode::BeginLoadQueryEvent,
            18 => TypeCode::ExecuteLoadQueryEvent,
            19 => TypeCode::TableMapEvent,
            20 => TypeCode::PreGaWriteRowsEvent,
            21 => TypeCode::PreGaUpdateRowsEvent,
            22 => TypeCode::PreGaDeleteRowsEvent,
            23 => TypeCode::WriteRowsEventV1,
            24 => TypeCode::UpdateRowsEventV1,
            25 => TypeCode::DeleteRowsEventV1,
            26 => TypeCode::IncidentEvent,
            27 => TypeCode::HeartbeatLogEvent,
            28 => TypeCode::IgnorableLogEvent,
            29 => TypeCode::RowsQueryLogEvent,
            30 => TypeCode::WriteRowsEventV2,
            31 => TypeCode::UpdateRowsEventV2,
            32 => TypeCode::DeleteRowsEventV2,
            33 => TypeCode::GtidLogEvent,
            34 => TypeCode::AnonymousGtidLogEvent,
            35 => TypeCode::PreviousGtidsLogEvent,
            i => TypeCode::OtherUnknown(i),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            TypeCode::Unknown => 0,
            TypeCode::StartEventV3 => 1,
            TypeCode::QueryEvent => 2,
            TypeCode::StopEvent => 3,
            TypeCode::RotateEvent => 4,
            TypeCode::IntvarEvent => 5,
            TypeCode::LoadEvent => 6,
            TypeCode::SlaveEvent => 7,
            TypeCode::CreateFileEvent => 8,
            TypeCode::AppendBlockEvent => 9,
            TypeCode::ExecLoadEvent => 10,
            TypeCode::DeleteFileEvent => 11,
            TypeCode::NewLoadEvent => 12,
            TypeCode::RandEvent => 13,
            TypeCode::UserVarEvent => 14,
            TypeCode::FormatDescriptionEvent => 15,
            TypeCode::XidEvent => 16,
            TypeCode::BeginLoadQueryEvent => 17,
            TypeCode::ExecuteLoadQueryEvent => 18,
            TypeCode::TableMapEvent => 19,
            TypeCode::PreGaWriteRowsEvent => 20,
            TypeCode::PreGaUpdateRowsEvent => 21,
            TypeCode::PreGaDeleteRowsEvent => 22,
            TypeCode::WriteRowsEventV1 => 23,
            TypeCode::UpdateRowsEventV1 => 24,
            TypeCode::DeleteRowsEventV1 => 25,
            TypeCode::IncidentEvent => 26,
            TypeCode::HeartbeatLogEvent => 27,
            TypeCode::IgnorableLogEvent => 28,
            TypeCode::RowsQueryLogEvent => 29,
            TypeCode::WriteRowsEventV2 => 30,
            TypeCode::UpdateRowsEventV2 => 31,
            TypeCode::DeleteRowsEventV2 => 32,
            TypeCode::GtidLogEvent => 33,
            TypeCode::AnonymousGtidLogEvent => 34,
            TypeCode::PreviousGtidsLogEvent => 35,
            TypeCode::OtherUnknown(i) => i,
        }
    }

    pub fn is_write_rows(self) -> bool {
        matches!(self, TypeCode::WriteRowsEventV1 | TypeCode::WriteRowsEventV2)
    }

    pub fn is_update_rows(self) -> bool {
        matches!(self, TypeCode::UpdateRowsEventV1 | TypeCode::UpdateRowsEventV2)
    }

    pub fn is_delete_rows(self) -> bool {
        matches!(self, TypeCode::DeleteRowsEventV1 | TypeCode::DeleteRowsEventV2)
    }

    pub fn is_rows_event(self) -> bool {
        self.is_write_rows() || self.is_update_rows() || self.is_delete_rows()
    }

    /// The inverse row-event type: WRITE <-> DELETE. Panics on non-row types;
    /// callers must check `is_write_rows`/`is_delete_rows` first.
    pub fn inverse_row_type(self) -> TypeCode {
        match self {
            TypeCode::WriteRowsEventV1 => TypeCode::DeleteRowsEventV1,
            TypeCode::WriteRowsEventV2 => TypeCode::DeleteRowsEventV2,
            TypeCode::DeleteRowsEventV1 => TypeCode::WriteRowsEventV1,
            TypeCode::DeleteRowsEventV2 => TypeCode::WriteRowsEventV2,
            other => panic!("{:?} has no write/delete inverse", other),
        }
    }
}

/// The fixed, 19-byte event header common to every binlog event.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub timestamp: u32,
    pub type_code: TypeCode,
    pub server_id: u32,
    pub data_written: u32,
    pub log_pos: u32,
    pub flags: u16,
}

impl Header {
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Self {
        Header {
            timestamp: LittleEndian::read_u32(&buf[0..4]),
            type_code: TypeCode::from_byte(buf[4]),
            server_id: LittleEndian::read_u32(&buf[5..9]),
            data_written: LittleEndian::read_u32(&buf[9..13]),
            log_pos: LittleEndian::read_u32(&buf[13..17]),
            flags: LittleEndian::read_u16(&buf[17..19]),
        }
    }

    pub fn encode(&self, buf: &mut [u8; HEADER_LEN]) {
        LittleEndian::write_u32(&mut buf[0..4], self.timestamp);
        buf[4] = self.type_code.to_byte();
        LittleEndian::write_u32(&mut buf[5..9], self.server_id);
        LittleEndian::write_u32(&mut buf[9..13], self.data_written);
        LittleEndian::write_u32(&mut buf[13..17], self.log_pos);
        LittleEndian::write_u16(&mut buf[17..19], self.flags);
    }

    /// `data_written` minus the header and (if present) the trailing checksum:
    /// the number of body bytes actually carrying event-specific data.
    pub fn body_len(&self, checksum_enabled: bool) -> u32 {
        self.data_written - HEADER_LEN as u32 - if checksum_enabled { CHECKSUM_LEN } else { 0 }
    }

    /// Invariant I1: `log_pos - data_written == offset_of(event)`.
    pub fn check_position(&self, offset: u64) -> Result<(), crate::errors::Error> {
        let matches = (self.log_pos as u64)
            .checked_sub(self.data_written as u64)
            .map_or(false, |expected| expected == offset);
        if !matches {
            return Err(crate::errors::Error::CorruptEvent {
                offset,
                log_pos: self.log_pos,
                data_written: self.data_written,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            timestamp: 0x0102_0304,
            type_code: TypeCode::XidEvent,
            server_id: 7,
            data_written: 27,
            log_pos: 150,
            flags: 0,
        }
    }

    #[test]
    fn test_round_trip() {
        let h = sample();
        let mut buf = [0u8; HEADER_LEN];
        h.encode(&mut buf);
        let decoded = Header::decode(&buf);
        assert_eq!(decoded.timestamp, h.timestamp);
        assert_eq!(decoded.type_code, h.type_code);
        assert_eq!(decoded.server_id, h.server_id);
        assert_eq!(decoded.data_written, h.data_written);
        assert_eq!(decoded.log_pos, h.log_pos);
        assert_eq!(decoded.flags, h.flags);
    }

    #[test]
    fn test_body_len() {
        let h = sample();
        assert_eq!(h.body_len(false), 27 - 19);
        assert_eq!(h.body_len(true), 27 - 19 - 4);
    }

    #[test]
    fn test_check_position_ok() {
        let h = sample();
        // log_pos(150) - data_written(27) == 123
        assert!(h.check_position(123).is_ok());
    }

    #[test]
    fn test_check_position_corrupt() {
        let h = sample();
        let err = h.check_position(124).unwrap_err();
        match err {
            crate::errors::Error::CorruptEvent { offset, .. } => assert_eq!(offset, 124),
            other => panic!("wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_type_code_round_trip() {
        for b in 0u8..=35 {
            assert_eq!(TypeCode::from_byte(b).to_byte(), b);
        }
        assert_eq!(TypeCode::from_byte(200).to_byte(), 200);
    }

    #[test]
    fn test_inverse_row_type() {
        assert_eq!(
            TypeCode::WriteRowsEventV2.inverse_row_type(),
            TypeCode::DeleteRowsEventV2
        );
        assert_eq!(
            TypeCode::DeleteRowsEventV1.inverse_row_type(),
            TypeCode::WriteRowsEventV1
        );
    }
}
