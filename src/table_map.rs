//! Table-map event decoding.
//!
//! A table-map event binds a numeric table id to a column count and a list
//! of per-column type codes. The inverter only needs `column_count` and
//! `column_types` to walk a row image; `schema_name`/`table_name` are kept
//! purely for diagnostic logging, the way the teacher's `table_map.rs`
//! retained them for `EventIterator`'s public `BinlogEvent`.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::column::ColumnType;
use crate::leint::read_length_encoded_int;

#[derive(Debug, Clone)]
pub struct TableMap {
    pub table_id: u64,
    pub schema_name: String,
    pub table_name: String,
    pub column_types: Vec<ColumnType>,
}

impl TableMap {
    pub fn column_count(&self) -> usize {
        self.column_types.len()
    }

    /// Decode a table-map event's body (the bytes following the 19-byte
    /// header, excluding any trailing checksum).
    pub fn decode(body: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(body);
        let mut table_id_buf = [0u8; 8];
        cursor.read_exact(&mut table_id_buf[0..6])?;
        let table_id = LittleEndian::read_u64(&table_id_buf);
        // 2-byte reserved flags field
        cursor.seek(SeekFrom::Current(2))?;

        let schema_name = read_one_byte_length_prefixed_string(&mut cursor)?;
        cursor.seek(SeekFrom::Current(1))?; // nul terminator
        let table_name = read_one_byte_length_prefixed_string(&mut cursor)?;
        cursor.seek(SeekFrom::Current(1))?; // nul terminator

        let pos = cursor.position() as usize;
        let (column_count, consumed) = read_length_encoded_int(&body[pos..])
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "truncated column count"))?;
        cursor.seek(SeekFrom::Current(consumed as i64))?;

        let mut column_types = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            column_types.push(ColumnType(cursor.read_u8()?));
        }

        Ok(TableMap {
            table_id,
            schema_name,
            table_name,
            column_types,
        })
    }
}

fn read_one_byte_length_prefixed_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = r.read_u8()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
