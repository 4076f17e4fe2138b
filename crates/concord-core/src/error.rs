use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConcordError {
    #[error("cannot combine tables: expected {expected} columns but table {table} has {found}")]
    ColumnArityMismatch {
        expected: usize,
        found: usize,
        table: String,
    },

    #[error("no tables selected for combination")]
    EmptyCombination,

    #[error("invalid table id '{0}', expected PAGE:ORDINAL")]
    InvalidTableId(String),

    #[error("no extracted table at page {page}, ordinal {ordinal}")]
    UnknownTable { page: usize, ordinal: usize },

    #[error("invalid number '{value}'")]
    NumericParseFailure { value: String },

    #[error("{source_name} columns are misaligned: {keys} keys, {quantities} quantities, {totals} totals")]
    MisalignedColumns {
        source_name: String,
        keys: usize,
        quantities: usize,
        totals: usize,
    },

    #[error("invalid content block: {0}")]
    InvalidBlock(String),

    #[error("rendering failed: {0}")]
    RenderFailure(String),

    #[error("table extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("dataset '{dataset}' has no column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("failed to load dataset from {path}: {reason}")]
    DatasetLoad { path: PathBuf, reason: String },

    #[error("unsupported dataset format: {0}. Expected .csv or .xlsx")]
    UnsupportedDataset(String),

    #[error("title lookup failed: {0}")]
    Lookup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}
