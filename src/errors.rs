use thiserror::Error;

use crate::header::TypeCode;

/// Closed error taxonomy for scanning and emitting a compensating binlog.
///
/// `EOF` and the scanner's internal end-of-transaction signal are not part
/// of this type: both are control flow local to `scanner`, never surfaced
/// to a caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad magic bytes at start of binlog: {0:?}")]
    BadMagic([u8; 4]),

    #[error("first event in binlog was not a FORMAT_DESCRIPTION_EVENT")]
    MissingFormatDescription,

    #[error("corrupt event at offset {offset}: log_pos({log_pos}) - data_written({data_written}) != {offset}")]
    CorruptEvent {
        offset: u64,
        log_pos: u32,
        data_written: u32,
    },

    #[error("unexpected event type {found:?} while {state}")]
    UnexpectedEventType {
        found: TypeCode,
        state: &'static str,
    },

    #[error("event at offset {offset} (data_written={data_written}) exceeds the configured maximum of {max} bytes")]
    EventTooBig {
        offset: u64,
        data_written: u32,
        max: u32,
    },

    #[error("checksum mismatch for event at offset {offset}")]
    BadChecksum { offset: u64 },
}
