//! Cell-grid model over partner tabular input.
//!
//! Partner files arrive as the CSV serialization of a spreadsheet or as
//! native delimited text. Both become a [`Sheet`]: a ragged grid of trimmed
//! string cells that fixed-offset extractors address by (row, column) and
//! header-based extractors wrap in a [`HeaderIndex`] for alias probing.

use crate::errors::ExtractError;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Clone)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Parses raw bytes into a grid. Rows may have differing cell counts;
    /// quoted cells may span lines. Fails only when nothing tabular can be
    /// read at all.
    pub fn parse(bytes: &[u8]) -> Result<Self, ExtractError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| cell.trim().to_string())
                    .collect::<Vec<_>>(),
            );
        }

        if rows.iter().all(|row| Self::row_is_blank(row)) {
            return Err(ExtractError::Empty);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at (row, column); empty string when out of bounds. Fixed-offset
    /// extractors lean on this so a short row reads as blank, not a panic.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_is_blank(row: &[String]) -> bool {
        row.iter().all(|cell| cell.is_empty())
    }

    /// Finds the first row that looks like a column-header row: at least
    /// `min_filled` non-empty cells. Partner exports often stack title and
    /// banner rows above the real header.
    pub fn find_header_row(&self, min_filled: usize) -> Option<usize> {
        self.rows.iter().position(|row| {
            row.iter().filter(|cell| !cell.is_empty()).count() >= min_filled
        })
    }
}

/// Case-insensitive column lookup built from a header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    pub fn new(header_row: &[String]) -> Self {
        Self {
            headers: header_row
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect(),
        }
    }

    /// Probes an ordered alias list and returns the column of the first
    /// alias present. The alias order encodes format history: newest header
    /// names first.
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            let alias = alias.to_lowercase();
            self.headers.iter().position(|h| *h == alias)
        })
    }

    pub fn contains(&self, aliases: &[&str]) -> bool {
        self.find(aliases).is_some()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// One data row viewed through a [`HeaderIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    index: &'a HeaderIndex,
    row: &'a [String],
}

impl<'a> Record<'a> {
    pub fn new(index: &'a HeaderIndex, row: &'a [String]) -> Self {
        Self { index, row }
    }

    /// First non-empty value among the aliased columns, if any.
    pub fn field(&self, aliases: &[&str]) -> Option<&'a str> {
        for &alias in aliases {
            if let Some(col) = self.index.find(&[alias]) {
                if let Some(value) = self.row.get(col).map(String::as_str) {
                    if !value.is_empty() {
                        return Some(value);
                    }
                }
            }
        }
        None
    }

    pub fn field_string(&self, aliases: &[&str]) -> Option<String> {
        self.field(aliases).map(str::to_string)
    }

    pub fn is_blank(&self) -> bool {
        Sheet::row_is_blank(self.row)
    }
}
