pub mod pdftotext;
pub mod table;

use crate::error::ConcordError;
use crate::tables::RawTable;

/// Text of a single PDF page, one entry per layout line.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for table extraction backends.
///
/// Every returned table carries its page number and its 1-based ordinal
/// among the tables on that page. Backend failures are returned as-is.
pub trait TableExtractor: Send + Sync {
    /// Extract tables from PDF bytes, in page order.
    fn extract_tables(&self, pdf_bytes: &[u8]) -> Result<Vec<RawTable>, ConcordError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
