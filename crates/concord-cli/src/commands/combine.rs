use concord_core::error::ConcordError;
use concord_core::extraction::pdftotext::PdftotextExtractor;
use concord_core::tables::TableId;
use std::path::PathBuf;

pub fn run(
    pdf_file: PathBuf,
    tables: &[String],
    filters: Option<PathBuf>,
    headers: Vec<String>,
    out: Option<PathBuf>,
) -> Result<(), ConcordError> {
    let ids = tables
        .iter()
        .map(|t| t.parse::<TableId>())
        .collect::<Result<Vec<_>, _>>()?;

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let mut pipeline = concord_core::extract_tables(&pdf_bytes, &extractor)?;

    if let Some(path) = filters {
        let json = std::fs::read_to_string(&path)?;
        let count = pipeline.load_filters(&json)?;
        eprintln!("Applied {count} saved filter(s) from {}", path.display());
    }

    let combined = pipeline.combine(&ids)?;
    let headers = (!headers.is_empty()).then_some(headers.as_slice());

    match out {
        Some(path) => {
            combined.write_csv(&path, headers)?;
            eprintln!(
                "Combined {} table(s), {} row(s), written to {}",
                combined.sources.len(),
                combined.row_count(),
                path.display()
            );
        }
        None => print!("{}", combined.to_csv_string(headers)?),
    }
    Ok(())
}
