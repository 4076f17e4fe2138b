use crate::extraction::PageContent;
use crate::tables::RawTable;

/// Minimum number of cells for a layout line to count as a table row.
const MIN_CELLS: usize = 2;

/// Minimum number of consecutive rows that make up a table.
const MIN_ROWS: usize = 2;

/// Reconstruct tables from `pdftotext -layout` output.
///
/// pdftotext -layout preserves column alignment using spaces, so a table is
/// a run of consecutive lines that each split into at least two cells on
/// gaps of 2+ spaces. Ordinals restart at 1 on every page.
pub fn detect_tables(pages: &[PageContent]) -> Vec<RawTable> {
    let mut tables = Vec::new();

    for page in pages {
        let mut ordinal = 0;
        let mut current: Vec<Vec<String>> = Vec::new();

        let mut flush = |rows: &mut Vec<Vec<String>>, tables: &mut Vec<RawTable>| {
            if rows.len() >= MIN_ROWS {
                ordinal += 1;
                tables.push(RawTable::new(
                    page.page_number,
                    ordinal,
                    std::mem::take(rows),
                ));
            } else {
                rows.clear();
            }
        };

        for line in &page.lines {
            let cells = split_by_whitespace_gaps(line);
            if cells.len() >= MIN_CELLS {
                current.push(cells.into_iter().map(str::to_string).collect());
            } else {
                flush(&mut current, &mut tables);
            }
        }
        flush(&mut current, &mut tables);
    }

    tables
}

/// Split a line by gaps of 2+ whitespace characters.
pub fn split_by_whitespace_gaps(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = None;
    let mut end = 0;
    let mut space_count = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            space_count += 1;
            if space_count == 2 {
                if let Some(s) = start.take() {
                    segments.push(&line[s..end]);
                }
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            end = i + c.len_utf8();
            space_count = 0;
        }
    }

    if let Some(s) = start {
        segments.push(&line[s..end]);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_whitespace_gaps() {
        let segments = split_by_whitespace_gaps("  Cálculo diferencial   9780134685991    2  ");
        assert_eq!(segments, vec!["Cálculo diferencial", "9780134685991", "2"]);
    }

    #[test]
    fn test_single_space_does_not_split() {
        assert_eq!(split_by_whitespace_gaps("Total a pagar"), vec!["Total a pagar"]);
    }

    #[test]
    fn test_detect_tables_assigns_page_ordinals() {
        let pages = vec![
            PageContent {
                page_number: 1,
                lines: vec![
                    "Factura 001".into(),
                    "ISBN            Cantidad    PNT".into(),
                    "9780134685991   2           100.00".into(),
                    "".into(),
                    "Resumen".into(),
                    "Libros   3".into(),
                    "Revistas   1".into(),
                ],
            },
            PageContent {
                page_number: 2,
                lines: vec!["0306406152   1   50.00".into(), "solo".into()],
            },
        ];

        let tables = detect_tables(&pages);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].id().page, 1);
        assert_eq!(tables[0].id().ordinal, 1);
        assert_eq!(tables[0].column_count(), 3);
        assert_eq!(tables[1].id().ordinal, 2);
        assert_eq!(tables[1].rows()[0], vec!["Libros", "3"]);
    }
}
