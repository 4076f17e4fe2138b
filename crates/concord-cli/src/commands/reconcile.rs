use concord_core::dataset::load_dataset;
use concord_core::error::ConcordError;
use concord_core::report::NoLookup;
use concord_core::ColumnSelection;
use std::path::PathBuf;

use crate::output;

pub struct ReconcileArgs {
    pub report: PathBuf,
    pub invoice: PathBuf,
    pub report_columns: ColumnSelection,
    pub invoice_columns: ColumnSelection,
    pub pdf: Option<PathBuf>,
    pub output: String,
}

pub fn run(args: ReconcileArgs) -> Result<(), ConcordError> {
    let report = load_dataset(&args.report)?;
    let invoice = load_dataset(&args.invoice)?;
    let reconciliation = concord_core::reconcile_datasets(
        &report,
        &args.report_columns,
        &invoice,
        &args.invoice_columns,
    )?;

    match args.output.as_str() {
        "json" => output::json::print(&reconciliation)?,
        _ => println!("{}", output::table::format_reconciliation(&reconciliation)),
    }

    if let Some(pdf) = args.pdf {
        super::write_report_pdf(&reconciliation, &NoLookup, &pdf)?;
    }
    Ok(())
}
