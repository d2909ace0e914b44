//! The subset of MySQL's column type codes the inverter needs: just enough
//! to decide whether a column is fixed-width (and how wide) or variable
//! (length-prefixed). Decoding the *value* of a column is out of scope;
//! only its on-wire width matters for walking past it.

/// A column type as it appears in a table-map event's column-type array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnType(pub u8);

impl ColumnType {
    pub const TINY: u8 = 1;
    pub const SHORT: u8 = 2;
    pub const LONG: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const DOUBLE: u8 = 5;
    pub const LONGLONG: u8 = 8;
    pub const INT24: u8 = 9;
    pub const YEAR: u8 = 13;

    /// Fixed byte width of this column's row-image representation, or
    /// `None` if the column is variable-width (walked via its own
    /// length-encoded integer prefix instead).
    pub fn fixed_size(self) -> Option<usize> {
        match self.0 {
            Self::TINY => Some(1),
            Self::SHORT | Self::YEAR => Some(2),
            Self::FLOAT | Self::LONG | Self::INT24 => Some(4),
            Self::DOUBLE | Self::LONGLONG => Some(8),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnType;

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(ColumnType(ColumnType::TINY).fixed_size(), Some(1));
        assert_eq!(ColumnType(ColumnType::SHORT).fixed_size(), Some(2));
        assert_eq!(ColumnType(ColumnType::YEAR).fixed_size(), Some(2));
        assert_eq!(ColumnType(ColumnType::FLOAT).fixed_size(), Some(4));
        assert_eq!(ColumnType(ColumnType::LONG).fixed_size(), Some(4));
        assert_eq!(ColumnType(ColumnType::INT24).fixed_size(), Some(4));
        assert_eq!(ColumnType(ColumnType::DOUBLE).fixed_size(), Some(8));
        assert_eq!(ColumnType(ColumnType::LONGLONG).fixed_size(), Some(8));
    }

    #[test]
    fn test_variable_width() {
        // VARCHAR
        assert_eq!(ColumnType(15).fixed_size(), None);
        // NEWDECIMAL
        assert_eq!(ColumnType(246).fixed_size(), None);
        // BLOB
        assert_eq!(ColumnType(252).fixed_size(), None);
    }
}
