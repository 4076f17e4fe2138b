pub mod dataset;
pub mod error;
pub mod extraction;
pub mod key;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod tables;

use dataset::Dataset;
use error::ConcordError;
use extraction::TableExtractor;
use reconcile::{Reconciliation, SourceColumns};
use render::RenderOptions;
use report::{ReportPlan, TitleLookup};
use tables::TablePipeline;
use tracing::debug;

/// Header fragment used to find the report's quantity column when none is named.
pub const QUANTITY_COLUMN_HINT: &str = "cnt";

/// Extract every table from a PDF and hand them to a fresh pipeline.
pub fn extract_tables(
    pdf_bytes: &[u8],
    extractor: &dyn TableExtractor,
) -> Result<TablePipeline, ConcordError> {
    let tables = extractor.extract_tables(pdf_bytes)?;
    debug!(
        backend = extractor.backend_name(),
        tables = tables.len(),
        "tables extracted"
    );
    Ok(TablePipeline::new(tables))
}

/// Which columns of a dataset hold the key, quantity and net total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    pub key: String,
    /// `None` picks the first header containing [`QUANTITY_COLUMN_HINT`].
    pub quantity: Option<String>,
    pub total: String,
}

impl ColumnSelection {
    pub fn new(key: &str, quantity: Option<&str>, total: &str) -> Self {
        Self {
            key: key.to_string(),
            quantity: quantity.map(str::to_string),
            total: total.to_string(),
        }
    }

    /// Column layout of the supplier's sales report export.
    pub fn supplier_report() -> Self {
        Self::new("f_articulo", None, "total")
    }

    /// Pull the selected columns out of `dataset`.
    pub fn resolve(&self, dataset: &Dataset) -> Result<SourceColumns, ConcordError> {
        let quantity_header = match &self.quantity {
            Some(name) => name.clone(),
            None => dataset
                .column_containing(QUANTITY_COLUMN_HINT)
                .map(str::to_string)
                .ok_or_else(|| ConcordError::MissingColumn {
                    dataset: dataset.name.clone(),
                    column: format!("*{QUANTITY_COLUMN_HINT}*"),
                })?,
        };
        Ok(SourceColumns::new(
            dataset.column(&self.key)?,
            dataset.column(&quantity_header)?,
            dataset.column(&self.total)?,
        ))
    }
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self::supplier_report()
    }
}

/// Key-presence reconciliation of one column from each dataset.
pub fn reconcile_dataset_keys(
    report: &Dataset,
    report_column: &str,
    invoice: &Dataset,
    invoice_column: &str,
) -> Result<Reconciliation, ConcordError> {
    let keys_report = report.column(report_column)?;
    let keys_invoice = invoice.column(invoice_column)?;
    Ok(reconcile::reconcile_keys(&keys_report, &keys_invoice))
}

/// Extended reconciliation of a supplier report against an invoice.
pub fn reconcile_datasets(
    report: &Dataset,
    report_columns: &ColumnSelection,
    invoice: &Dataset,
    invoice_columns: &ColumnSelection,
) -> Result<Reconciliation, ConcordError> {
    let report_side = report_columns.resolve(report)?;
    let invoice_side = invoice_columns.resolve(invoice)?;
    reconcile::reconcile_extended(&report_side, &invoice_side)
}

/// A rendered report and the file name it should be stored under.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub plan: ReportPlan,
    pub filename: &'static str,
    pub bytes: Vec<u8>,
}

/// Classify a reconciliation, build the matching report and render it.
///
/// `base` supplies the app name, version and timestamp; the plan decides
/// title, orientation and margins.
pub fn render_report(
    reconciliation: &Reconciliation,
    lookup: &dyn TitleLookup,
    base: &RenderOptions,
) -> Result<RenderedReport, ConcordError> {
    let plan = report::plan_report(reconciliation, lookup)?;
    let options = plan.render_options(base);
    let bytes = render::render_document(&plan.blocks, &options)?;
    let filename = report::builders::default_filename(&plan, reconciliation.mode);
    Ok(RenderedReport {
        plan,
        filename,
        bytes,
    })
}
