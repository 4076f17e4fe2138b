use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::dataset::{dataset_name, Dataset};
use crate::error::ConcordError;

/// Load a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<Dataset, ConcordError> {
    let file = std::fs::File::open(path).map_err(|e| ConcordError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_csv(&dataset_name(path), file).map_err(|e| ConcordError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse CSV from any reader. Rows may have differing lengths.
pub fn parse_csv<R: Read>(name: &str, reader: R) -> Result<Dataset, ConcordError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Dataset::new(name, headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_quoted_cells() {
        let data = "ISBN,Cantidad,PNT\n978-0-13-468599-1,\"2 1\",\"$1,200.50\"\n0306406152,1\n";
        let ds = parse_csv("factura", data.as_bytes()).unwrap();
        assert_eq!(ds.name, "factura");
        assert_eq!(ds.headers, vec!["ISBN", "Cantidad", "PNT"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("PNT").unwrap(), vec!["$1,200.50", ""]);
        assert_eq!(ds.column("Cantidad").unwrap(), vec!["2 1", "1"]);
    }
}
