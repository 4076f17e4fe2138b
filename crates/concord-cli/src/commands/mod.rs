pub mod combine;
pub mod keys;
pub mod reconcile;
pub mod tables;

use std::path::Path;

use concord_core::error::ConcordError;
use concord_core::reconcile::Reconciliation;
use concord_core::render::{DocumentSink, FileSink, RenderOptions};
use concord_core::report::TitleLookup;
use tracing::debug;

/// Render the report for `reconciliation` to `path`.
///
/// An existing directory gets the report's default file name.
pub fn write_report_pdf(
    reconciliation: &Reconciliation,
    lookup: &dyn TitleLookup,
    path: &Path,
) -> Result<(), ConcordError> {
    let rendered = concord_core::render_report(reconciliation, lookup, &RenderOptions::default())?;
    debug!(
        tier = %rendered.plan.tier,
        bytes = rendered.bytes.len(),
        "report rendered"
    );

    let (mut sink, filename) = if path.is_dir() {
        (FileSink::new(path), rendered.filename.to_string())
    } else {
        FileSink::for_path(path)?
    };
    sink.commit(&filename, &rendered.bytes)?;

    eprintln!(
        "Report ({}) written to {}",
        rendered.plan.tier,
        sink.dir().join(&filename).display()
    );
    Ok(())
}
