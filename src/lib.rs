//! Produces a compensating binary log for a MySQL binlog.
//!
//! Given a binlog containing a sequence of committed, row-based
//! transactions, this crate emits a new binlog which, if applied after the
//! original, undoes those transactions: row insertions become deletions,
//! deletions become insertions, and row updates swap their before/after
//! images. Transactions are emitted in reverse commit order, and the row
//! events within each transaction are reversed as well, so replaying the
//! output restores the state the input started from.
//!
//! # Limitations
//!
//! - Only row-based replication events are understood; a transaction
//!   boundary other than `BEGIN`/XID is rejected.
//! - Only fixed-width numeric column types are walked directly; every
//!   other type is treated as a length-prefixed opaque blob. Decoding
//!   column *values* is out of scope.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! fn main() -> Result<(), binlog_undo::Error> {
//!     let input = File::open("bin-log.000001")?;
//!     let mut output = File::create("bin-log.000001.undo")?;
//!     binlog_undo::undo_reader(input, &mut output)
//! }
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

mod bit_set;
pub mod checksum;
pub mod column;
pub mod emitter;
pub mod errors;
pub mod format_description;
pub mod header;
pub mod inverter;
pub mod io;
mod leint;
pub mod orchestrator;
pub mod scanner;
pub mod table_map;

#[cfg(test)]
mod testutil;

pub use errors::Error;
pub use io::PositionedRead;
pub use orchestrator::Config;

/// Builder to configure a single undo run.
pub struct BinlogUndoBuilder<R> {
    reader: R,
    config: Config,
}

impl BinlogUndoBuilder<File> {
    /// Construct a builder reading from the file at `path`.
    pub fn try_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = File::open(path)?;
        Ok(BinlogUndoBuilder {
            reader,
            config: Config::default(),
        })
    }
}

impl<R: PositionedRead> BinlogUndoBuilder<R> {
    /// Construct a builder reading from any `Read + Seek` source.
    pub fn try_from_reader(reader: R) -> Result<Self, Error> {
        Ok(BinlogUndoBuilder {
            reader,
            config: Config::default(),
        })
    }

    /// Override the default configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Scan the input and write the compensating binlog to `output`.
    pub fn run<W: Write>(self, output: &mut W) -> Result<(), Error> {
        orchestrator::run(self.reader, output, &self.config)
    }
}

/// Undo the transactions in the binlog at `path`, writing the result to
/// `output`, using the default configuration.
///
/// ## Errors
///
/// - returns an immediate error if the file cannot be opened or does not
///   begin with a valid format-description event
/// - returns an error partway through if the input is corrupt, has a
///   checksum mismatch, or an I/O failure occurs
pub fn undo_file<P: AsRef<Path>, W: Write>(path: P, output: &mut W) -> Result<(), Error> {
    BinlogUndoBuilder::try_from_path(path)?.run(output)
}

/// Undo the transactions readable from `reader`, writing the result to
/// `output`, using the default configuration.
pub fn undo_reader<R: PositionedRead, W: Write>(reader: R, output: &mut W) -> Result<(), Error> {
    BinlogUndoBuilder::try_from_reader(reader)?.run(output)
}
