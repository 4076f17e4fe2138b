use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, Xlsx};
use tracing::debug;

use crate::dataset::{dataset_name, Dataset};
use crate::error::ConcordError;

/// Load the first worksheet of an xlsx workbook. Row 1 holds the headers.
pub fn load_xlsx(path: &Path) -> Result<Dataset, ConcordError> {
    let bytes = std::fs::read(path).map_err(|e| ConcordError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_xlsx(&dataset_name(path), &bytes).map_err(|e| ConcordError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn parse_xlsx(name: &str, bytes: &[u8]) -> Result<Dataset, ConcordError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| ConcordError::UnsupportedDataset(format!("failed to open xlsx: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ConcordError::UnsupportedDataset("workbook has no sheets".into()))?;
    let sheet = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ConcordError::UnsupportedDataset(format!("sheet '{sheet_name}': {e}")))?;

    let mut rows = sheet.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_as_string).collect::<Vec<_>>())
        .unwrap_or_default();

    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_as_string).collect())
        .filter(|row: &Vec<String>| row.iter().any(|c| !c.is_empty()))
        .collect();

    debug!(sheet = %sheet_name, rows = rows.len(), "loaded xlsx worksheet");
    Ok(Dataset::new(name, headers, rows))
}

fn cell_as_string(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.trim().to_string(),
        calamine::Data::Float(f) => float_to_string(*f),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}

/// Whole floats print without a fractional part so numeric ISBN cells
/// ("9780134685991") survive the round trip through f64.
fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_floats_print_as_integers() {
        assert_eq!(float_to_string(9780134685991.0), "9780134685991");
        assert_eq!(float_to_string(3.0), "3");
        assert_eq!(float_to_string(12.5), "12.5");
    }

    #[test]
    fn test_string_cells_are_trimmed() {
        assert_eq!(
            cell_as_string(&calamine::Data::String("  f_articulo ".into())),
            "f_articulo"
        );
        assert_eq!(cell_as_string(&calamine::Data::Empty), "");
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(parse_xlsx("report", b"not a workbook").is_err());
    }
}
