pub mod export;
pub mod pipeline;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ConcordError;

pub use pipeline::{apply_filter, combine, SavedFilter, TablePipeline};

/// Stable identity of an extracted table: its page and its position among
/// the tables found on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    pub page: usize,
    pub ordinal: usize,
}

impl TableId {
    pub fn new(page: usize, ordinal: usize) -> Self {
        TableId { page, ordinal }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.ordinal)
    }
}

impl FromStr for TableId {
    type Err = ConcordError;

    /// Parses "2:1" as page 2, ordinal 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConcordError::InvalidTableId(s.to_string());
        let (page, ordinal) = s.split_once(':').ok_or_else(invalid)?;
        let page = page.trim().parse().map_err(|_| invalid())?;
        let ordinal = ordinal.trim().parse().map_err(|_| invalid())?;
        Ok(TableId::new(page, ordinal))
    }
}

/// A grid of text cells as produced by the extraction collaborator.
///
/// Ragged input rows are padded with empty cells so every row has
/// `column_count` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    id: TableId,
    column_count: usize,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(page: usize, ordinal: usize, rows: Vec<Vec<String>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(column_count, String::new());
                row
            })
            .collect();
        RawTable {
            id: TableId::new(page, ordinal),
            column_count,
            rows,
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Row/column selection applied to one `RawTable`.
///
/// `start_row..end_row` is a half-open range of row indices; `excluded_rows`
/// are absolute (0-based) row indices of the raw table; `included_columns`
/// are kept in the order given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub start_row: usize,
    pub end_row: usize,
    #[serde(default)]
    pub excluded_rows: BTreeSet<usize>,
    pub included_columns: Vec<usize>,
}

impl FilterSpec {
    /// A spec that keeps every row and column of `table`.
    pub fn select_all(table: &RawTable) -> Self {
        FilterSpec {
            start_row: 0,
            end_row: table.row_count(),
            excluded_rows: BTreeSet::new(),
            included_columns: (0..table.column_count()).collect(),
        }
    }
}

/// A `RawTable` after a `FilterSpec` has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredTable {
    pub source: TableId,
    pub column_count: usize,
    pub rows: Vec<Vec<String>>,
}

/// Concatenation of filtered tables sharing one column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedTable {
    pub column_count: usize,
    pub sources: Vec<TableId>,
    pub rows: Vec<Vec<String>>,
}

impl CombinedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_id_parse() {
        assert_eq!("2:1".parse::<TableId>().unwrap(), TableId::new(2, 1));
        assert_eq!(TableId::new(3, 4).to_string(), "3:4");
        assert!("2".parse::<TableId>().is_err());
        assert!("a:1".parse::<TableId>().is_err());
    }
}
