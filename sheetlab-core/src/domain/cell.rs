//! Raw cell values as produced by the file readers.
//!
//! A cell is either empty, already numeric (workbook cells carry types), or
//! text. Delimited-text readers only ever produce `Empty` and `Text`; the
//! workbook reader maps typed cells onto `Number` where possible.

/// One cell of an input file, before any parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Build a cell from a text field, collapsing whitespace-only to `Empty`.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawCell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
