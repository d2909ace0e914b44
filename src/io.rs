//! Byte I/O adapter: positioned reads from the input, sequential writes to
//! the output. Grounded on the teacher's `tell.rs` (a blanket trait impl
//! over `Seek`) and `binlog_file.rs`'s `read_at` (`seek` then
//! `read_exact`).

use std::io;
use std::io::{Read, Result, Seek, SeekFrom};

use crate::errors::Error;
use crate::header::{Header, HEADER_LEN};

/// A `Read + Seek` source that can be asked for the bytes at an absolute
/// offset, without the caller tracking the current seek position itself.
pub trait PositionedRead: Read + Seek {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf)
    }
}

impl<T: Read + Seek> PositionedRead for T {}

/// Reads one event at a time into a single reused scratch buffer, sized to
/// the configured maximum event size and grown (never shrunk) if a larger
/// event is seen. Mirrors the original tool's reuse of one `event_buffer`
/// for every event it reads.
pub struct EventReader<R> {
    reader: R,
    scratch: Vec<u8>,
}

impl<R: PositionedRead> EventReader<R> {
    pub fn new(reader: R, max_event_size: u32) -> Self {
        EventReader {
            reader,
            scratch: vec![0u8; max_event_size as usize],
        }
    }

    /// Read one full event (header, body, and checksum slot if any) at
    /// `offset` into the scratch buffer, returning its header. Returns
    /// `Ok(None)` on a clean end-of-file exactly at an event boundary.
    pub fn read_event(&mut self, offset: u64, max_event_size: u32) -> std::result::Result<Option<Header>, Error> {
        let mut hdr_buf = [0u8; HEADER_LEN];
        match self.reader.read_at(offset, &mut hdr_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let header = Header::decode(&hdr_buf);
        header.check_position(offset)?;
        if header.data_written > max_event_size {
            return Err(Error::EventTooBig {
                offset,
                data_written: header.data_written,
                max: max_event_size,
            });
        }
        let total = header.data_written as usize;
        if self.scratch.len() < total {
            self.scratch.resize(total, 0);
        }
        self.scratch[..HEADER_LEN].copy_from_slice(&hdr_buf);
        self.reader.read_at(offset + HEADER_LEN as u64, &mut self.scratch[HEADER_LEN..total])?;
        Ok(Some(header))
    }

    /// The full bytes of the most recently read event (header through the
    /// checksum slot, if any).
    pub fn event_bytes(&self, header: &Header) -> &[u8] {
        &self.scratch[..header.data_written as usize]
    }

    /// The event-specific body, excluding the header and any trailing
    /// checksum.
    pub fn body(&self, header: &Header, checksum_enabled: bool) -> &[u8] {
        let body_len = header.body_len(checksum_enabled) as usize;
        &self.scratch[HEADER_LEN..HEADER_LEN + body_len]
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
