use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConcordError;
use crate::tables::{CombinedTable, FilterSpec, FilteredTable, RawTable, TableId};

/// Apply a filter to a table.
///
/// Out-of-range indices are tolerated: the row range is clamped into
/// `[0, row_count]`, excluded rows outside it are ignored, and column
/// indices past the last column are dropped. Duplicate column indices keep
/// their first occurrence only.
pub fn apply_filter(table: &RawTable, spec: &FilterSpec) -> FilteredTable {
    let row_count = table.row_count();
    let start = spec.start_row.min(row_count);
    let end = spec.end_row.min(row_count).max(start);

    let mut columns: Vec<usize> = Vec::with_capacity(spec.included_columns.len());
    for &col in &spec.included_columns {
        if col < table.column_count() && !columns.contains(&col) {
            columns.push(col);
        }
    }

    let rows: Vec<Vec<String>> = table.rows()[start..end]
        .iter()
        .enumerate()
        .filter(|(offset, _)| !spec.excluded_rows.contains(&(start + offset)))
        .map(|(_, row)| columns.iter().map(|&col| row[col].clone()).collect())
        .collect();

    debug!(
        table = %table.id(),
        start,
        end,
        kept_rows = rows.len(),
        kept_columns = columns.len(),
        "applied table filter"
    );

    FilteredTable {
        source: table.id(),
        column_count: columns.len(),
        rows,
    }
}

/// Concatenate filtered tables in the order given.
///
/// Every table must have the same column count as the first one; otherwise
/// nothing is combined and `ColumnArityMismatch` is returned.
pub fn combine(tables: &[FilteredTable]) -> Result<CombinedTable, ConcordError> {
    let first = tables.first().ok_or(ConcordError::EmptyCombination)?;
    let expected = first.column_count;

    if let Some(bad) = tables.iter().find(|t| t.column_count != expected) {
        return Err(ConcordError::ColumnArityMismatch {
            expected,
            found: bad.column_count,
            table: bad.source.to_string(),
        });
    }

    let rows = tables
        .iter()
        .flat_map(|t| t.rows.iter().cloned())
        .collect::<Vec<_>>();

    Ok(CombinedTable {
        column_count: expected,
        sources: tables.iter().map(|t| t.source).collect(),
        rows,
    })
}

/// Owns the tables extracted from one document and the filters the caller
/// has saved for them, keyed by `(page, ordinal)`.
#[derive(Debug, Default)]
pub struct TablePipeline {
    tables: Vec<RawTable>,
    filters: HashMap<TableId, FilterSpec>,
}

impl TablePipeline {
    pub fn new(tables: Vec<RawTable>) -> Self {
        TablePipeline {
            tables,
            filters: HashMap::new(),
        }
    }

    pub fn tables(&self) -> &[RawTable] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> Result<&RawTable, ConcordError> {
        self.tables
            .iter()
            .find(|t| t.id() == id)
            .ok_or(ConcordError::UnknownTable {
                page: id.page,
                ordinal: id.ordinal,
            })
    }

    /// Save a filter for a table, replacing any earlier one.
    pub fn persist(&mut self, id: TableId, spec: FilterSpec) {
        self.filters.insert(id, spec);
    }

    pub fn recall(&self, id: TableId) -> Option<&FilterSpec> {
        self.filters.get(&id)
    }

    /// The table with its saved filter applied, or unfiltered if none was saved.
    pub fn filtered(&self, id: TableId) -> Result<FilteredTable, ConcordError> {
        let table = self.table(id)?;
        let filtered = match self.recall(id) {
            Some(spec) => apply_filter(table, spec),
            None => apply_filter(table, &FilterSpec::select_all(table)),
        };
        Ok(filtered)
    }

    /// Filter and combine the selected tables in the order given.
    pub fn combine(&self, ids: &[TableId]) -> Result<CombinedTable, ConcordError> {
        let filtered = ids
            .iter()
            .map(|&id| self.filtered(id))
            .collect::<Result<Vec<_>, _>>()?;
        combine(&filtered)
    }

    /// Persist every saved filter from a JSON list of `{page, ordinal, spec}`.
    pub fn load_filters(&mut self, json: &str) -> Result<usize, ConcordError> {
        let saved: Vec<SavedFilter> = serde_json::from_str(json)?;
        let count = saved.len();
        for entry in saved {
            self.persist(TableId::new(entry.page, entry.ordinal), entry.spec);
        }
        debug!(count, "loaded saved filters");
        Ok(count)
    }
}

/// A filter saved outside the pipeline, tagged with its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub page: usize,
    pub ordinal: usize,
    pub spec: FilterSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn grid(rows: usize, cols: usize) -> Vec<Vec<String>> {
        (0..rows)
            .map(|r| (0..cols).map(|c| format!("r{r}c{c}")).collect())
            .collect()
    }

    fn spec(start: usize, end: usize, excluded: &[usize], cols: &[usize]) -> FilterSpec {
        FilterSpec {
            start_row: start,
            end_row: end,
            excluded_rows: excluded.iter().copied().collect::<BTreeSet<_>>(),
            included_columns: cols.to_vec(),
        }
    }

    #[test]
    fn test_filter_selects_range_columns_and_exclusions() {
        let table = RawTable::new(1, 1, grid(5, 3));
        let filtered = apply_filter(&table, &spec(1, 4, &[2], &[2, 0]));
        assert_eq!(filtered.column_count, 2);
        assert_eq!(
            filtered.rows,
            vec![
                vec!["r1c2".to_string(), "r1c0".to_string()],
                vec!["r3c2".to_string(), "r3c0".to_string()],
            ]
        );
    }

    #[test]
    fn test_filter_clamps_out_of_range_indices() {
        let table = RawTable::new(1, 1, grid(3, 2));
        let filtered = apply_filter(&table, &spec(1, 99, &[0, 42], &[0, 1, 7]));
        assert_eq!(filtered.rows.len(), 2);
        assert_eq!(filtered.column_count, 2);

        let empty = apply_filter(&table, &spec(10, 2, &[], &[0]));
        assert!(empty.rows.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = RawTable::new(2, 1, grid(6, 4));
        let s = spec(1, 5, &[3], &[0, 3]);
        assert_eq!(apply_filter(&table, &s), apply_filter(&table, &s));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = RawTable::new(
            1,
            1,
            vec![vec!["a".into(), "b".into(), "c".into()], vec!["d".into()]],
        );
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows()[1], vec!["d", "", ""]);
    }

    #[test]
    fn test_combine_rejects_unequal_arity() {
        let t3 = RawTable::new(1, 1, grid(2, 3));
        let a = apply_filter(&t3, &FilterSpec::select_all(&t3));
        let t4 = RawTable::new(1, 2, grid(2, 4));
        let b = apply_filter(&t4, &FilterSpec::select_all(&t4));

        let err = combine(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            ConcordError::ColumnArityMismatch {
                expected: 3,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_combine_empty_selection() {
        assert!(matches!(combine(&[]), Err(ConcordError::EmptyCombination)));
    }

    #[test]
    fn test_pipeline_recalls_filter_by_stable_id() {
        let mut pipeline = TablePipeline::new(vec![
            RawTable::new(1, 1, grid(4, 2)),
            RawTable::new(2, 1, grid(3, 2)),
        ]);
        let id = TableId::new(1, 1);
        pipeline.persist(id, spec(1, 4, &[], &[0, 1]));

        // Regenerating the table with the same identity keeps the filter.
        let mut regenerated = TablePipeline::new(vec![RawTable::new(1, 1, grid(4, 2))]);
        regenerated.persist(id, pipeline.recall(id).cloned().unwrap());
        assert_eq!(
            pipeline.filtered(id).unwrap(),
            regenerated.filtered(id).unwrap()
        );

        let combined = pipeline.combine(&[id, TableId::new(2, 1)]).unwrap();
        assert_eq!(combined.row_count(), 3 + 3);
        assert_eq!(combined.rows[0], vec!["r1c0", "r1c1"]);
        assert_eq!(combined.sources, vec![id, TableId::new(2, 1)]);
    }

    #[test]
    fn test_pipeline_unknown_table() {
        let pipeline = TablePipeline::new(vec![]);
        assert!(matches!(
            pipeline.filtered(TableId::new(3, 1)),
            Err(ConcordError::UnknownTable { page: 3, ordinal: 1 })
        ));
    }

    #[test]
    fn test_load_filters_from_json() {
        let mut pipeline = TablePipeline::new(vec![RawTable::new(
            2,
            1,
            vec![
                vec!["ISBN".into(), "Qty".into()],
                vec!["9780134685991".into(), "2".into()],
            ],
        )]);
        let json = r#"[{"page": 2, "ordinal": 1,
            "spec": {"start_row": 1, "end_row": 2, "included_columns": [0]}}]"#;
        assert_eq!(pipeline.load_filters(json).unwrap(), 1);
        let filtered = pipeline.filtered(TableId::new(2, 1)).unwrap();
        assert_eq!(filtered.rows, vec![vec!["9780134685991".to_string()]]);
    }
}
