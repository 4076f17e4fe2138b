pub mod csv_file;
pub mod xlsx;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConcordError;

/// A named tabular dataset with text cells, as supplied by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Dataset {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Cells of the column whose header matches `name` exactly (after trimming).
    ///
    /// Short rows yield empty cells.
    pub fn column(&self, name: &str) -> Result<Vec<String>, ConcordError> {
        let index = self
            .headers
            .iter()
            .position(|h| h.trim() == name.trim())
            .ok_or_else(|| ConcordError::MissingColumn {
                dataset: self.name.clone(),
                column: name.to_string(),
            })?;
        Ok(self.column_at(index))
    }

    /// Header of the first column containing `fragment`, case-insensitively.
    pub fn column_containing(&self, fragment: &str) -> Option<&str> {
        let needle = fragment.to_lowercase();
        self.headers
            .iter()
            .find(|h| h.to_lowercase().contains(&needle))
            .map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_at(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect()
    }
}

/// Load a dataset, picking the reader from the file extension.
pub fn load_dataset(path: &Path) -> Result<Dataset, ConcordError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => csv_file::load_csv(path),
        "xlsx" | "xlsm" => xlsx::load_xlsx(path),
        other => Err(ConcordError::UnsupportedDataset(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}

/// Dataset name derived from the file stem.
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            "report",
            vec!["descripcion".into(), "f_articulo".into(), "Cnt Vendida".into()],
            vec![
                vec!["Libro".into(), "9780134685991".into(), "3".into()],
                vec!["Otro".into()],
            ],
        )
    }

    #[test]
    fn test_column_by_exact_name() {
        let ds = sample();
        assert_eq!(ds.column("f_articulo").unwrap(), vec!["9780134685991", ""]);
    }

    #[test]
    fn test_missing_column() {
        let err = sample().column("total").unwrap_err();
        assert!(matches!(err, ConcordError::MissingColumn { ref column, .. } if column == "total"));
    }

    #[test]
    fn test_column_containing_is_case_insensitive() {
        assert_eq!(sample().column_containing("cnt"), Some("Cnt Vendida"));
        assert_eq!(sample().column_containing("precio"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_dataset(Path::new("invoice.ods")).unwrap_err();
        assert!(matches!(err, ConcordError::UnsupportedDataset(_)));
    }
}
