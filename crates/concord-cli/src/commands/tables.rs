use concord_core::error::ConcordError;
use concord_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(pdf_file: PathBuf, output_format: &str) -> Result<(), ConcordError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new();
    let pipeline = concord_core::extract_tables(&pdf_bytes, &extractor)?;

    match output_format {
        "json" => output::json::print(pipeline.tables())?,
        _ => println!("{}", output::table::format_tables(pipeline.tables())),
    }
    Ok(())
}
