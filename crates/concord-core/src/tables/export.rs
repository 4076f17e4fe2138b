use std::path::Path;

use csv::WriterBuilder;

use crate::dataset::Dataset;
use crate::error::ConcordError;
use crate::tables::CombinedTable;

impl CombinedTable {
    /// Default headers `col_1..col_n` for a combined table.
    pub fn default_headers(&self) -> Vec<String> {
        (1..=self.column_count).map(|i| format!("col_{i}")).collect()
    }

    pub fn write_csv(&self, path: &Path, headers: Option<&[String]>) -> Result<(), ConcordError> {
        let mut writer = WriterBuilder::new().from_path(path)?;
        self.write_records(&mut writer, headers)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, headers: Option<&[String]>) -> Result<String, ConcordError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::<u8>::new());
        self.write_records(&mut writer, headers)?;
        writer.flush()?;

        let bytes = writer
            .into_inner()
            .map_err(|error| ConcordError::Io(error.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|error| ConcordError::Extraction(format!("invalid utf-8 csv output: {error}")))
    }

    /// Turn the combined table into a named dataset for reconciliation.
    ///
    /// Missing headers fall back to `col_N`.
    pub fn into_dataset(self, name: &str, headers: Option<Vec<String>>) -> Dataset {
        let mut headers = headers.unwrap_or_default();
        for i in headers.len()..self.column_count {
            headers.push(format!("col_{}", i + 1));
        }
        headers.truncate(self.column_count);
        Dataset::new(name, headers, self.rows)
    }

    fn write_records<W: std::io::Write>(
        &self,
        writer: &mut csv::Writer<W>,
        headers: Option<&[String]>,
    ) -> Result<(), ConcordError> {
        match headers {
            Some(h) => writer.write_record(h)?,
            None => writer.write_record(self.default_headers())?,
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(())
    }
}
