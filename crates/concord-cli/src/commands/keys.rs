use concord_core::dataset::load_dataset;
use concord_core::error::ConcordError;
use concord_core::report::{CatalogLookup, NoLookup, TitleLookup};
use std::path::PathBuf;

use crate::output;

pub struct KeysArgs {
    pub dataset_a: PathBuf,
    pub dataset_b: PathBuf,
    pub column_a: String,
    pub column_b: String,
    pub titles: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub output: String,
}

pub fn run(args: KeysArgs) -> Result<(), ConcordError> {
    let a = load_dataset(&args.dataset_a)?;
    let b = load_dataset(&args.dataset_b)?;
    let reconciliation =
        concord_core::reconcile_dataset_keys(&a, &args.column_a, &b, &args.column_b)?;

    match args.output.as_str() {
        "json" => output::json::print(&reconciliation)?,
        _ => println!("{}", output::table::format_reconciliation(&reconciliation)),
    }

    if let Some(pdf) = args.pdf {
        let lookup: Box<dyn TitleLookup> = match &args.titles {
            Some(path) => Box::new(CatalogLookup::from_path(path)?),
            None => Box::new(NoLookup),
        };
        super::write_report_pdf(&reconciliation, lookup.as_ref(), &pdf)?;
    }
    Ok(())
}
