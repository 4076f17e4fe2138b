//! End-to-end tests: extracted tables -> filters -> combined dataset ->
//! reconciliation -> report tier -> rendered PDF.
//!
//! Uses a MockExtractor that returns pre-built tables without invoking
//! pdftotext, so these tests run without poppler-utils.

use chrono::NaiveDate;
use concord_core::dataset::csv_file::parse_csv;
use concord_core::dataset::Dataset;
use concord_core::error::ConcordError;
use concord_core::extraction::TableExtractor;
use concord_core::reconcile::Mode;
use concord_core::render::{DocumentSink, FileSink, Orientation, RenderOptions};
use concord_core::report::{CatalogLookup, NoLookup, ReportTier};
use concord_core::tables::{FilterSpec, RawTable, TableId};
use concord_core::{
    extract_tables, reconcile_dataset_keys, reconcile_datasets, render_report, ColumnSelection,
};

struct MockExtractor {
    tables: Vec<RawTable>,
}

impl TableExtractor for MockExtractor {
    fn extract_tables(&self, _pdf_bytes: &[u8]) -> Result<Vec<RawTable>, ConcordError> {
        Ok(self.tables.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|l| l.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn options() -> RenderOptions {
    RenderOptions {
        app_name: "Concord".into(),
        app_version: "test".into(),
        generated_at: NaiveDate::from_ymd_opt(2024, 5, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap(),
        ..RenderOptions::default()
    }
}

fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}

/// Invoice spread over two pages; each page repeats the column header row.
fn invoice_extractor() -> MockExtractor {
    MockExtractor {
        tables: vec![
            RawTable::new(
                1,
                1,
                rows(&[
                    &["ISBN", "Cantidad", "PNT"],
                    &["978-0-13-468599-1", "2", "$1,000.00"],
                    &["0-306-40615-2", "1", "234.5"],
                ]),
            ),
            RawTable::new(1, 2, rows(&[&["Subtotal", "3"], &["IVA", "0"]])),
            RawTable::new(
                2,
                1,
                rows(&[&["ISBN", "Cantidad", "PNT"], &["9781492052593", "4", "80.00"]]),
            ),
        ],
    }
}

fn invoice_dataset() -> Dataset {
    let mut pipeline = extract_tables(&[], &invoice_extractor()).unwrap();
    for id in [TableId::new(1, 1), TableId::new(2, 1)] {
        let table = pipeline.table(id).unwrap();
        let spec = FilterSpec {
            start_row: 1,
            ..FilterSpec::select_all(table)
        };
        pipeline.persist(id, spec);
    }
    let combined = pipeline
        .combine(&[TableId::new(1, 1), TableId::new(2, 1)])
        .unwrap();
    assert_eq!(combined.row_count(), 3);
    combined.into_dataset(
        "invoice",
        Some(vec!["ISBN".into(), "Cantidad".into(), "PNT".into()]),
    )
}

fn supplier_report(csv: &str) -> Dataset {
    parse_csv("report", csv.as_bytes()).unwrap()
}

fn invoice_columns() -> ColumnSelection {
    ColumnSelection::new("ISBN", Some("Cantidad"), "PNT")
}

#[test]
fn combining_tables_with_different_arity_fails() {
    let pipeline = extract_tables(&[], &invoice_extractor()).unwrap();
    let err = pipeline
        .combine(&[TableId::new(1, 1), TableId::new(1, 2)])
        .unwrap_err();
    assert!(matches!(
        err,
        ConcordError::ColumnArityMismatch {
            expected: 3,
            found: 2,
            ..
        }
    ));
}

#[test]
fn fully_congruent_invoice_renders_single_page_report() {
    let report = supplier_report(
        "f_articulo,titulo,cnt_vendida,total\n\
         9780134685991,Effective Java,2,1000\n\
         0306406152,Signals,1,234.50\n\
         9781492052593,Rust,4,80\n",
    );
    let invoice = invoice_dataset();

    let rec = reconcile_datasets(
        &report,
        &ColumnSelection::supplier_report(),
        &invoice,
        &invoice_columns(),
    )
    .unwrap();
    assert_eq!(rec.mode, Mode::Extended);
    assert_eq!(rec.records.len(), 3);
    assert_eq!(rec.congruent_count(), 3);

    let rendered = render_report(&rec, &NoLookup, &options()).unwrap();
    assert_eq!(rendered.plan.tier, ReportTier::FullyCongruent);
    assert_eq!(rendered.filename, "congruence_full_report.pdf");
    assert_eq!(page_count(&rendered.bytes), 1);
}

#[test]
fn numeric_mismatch_is_classified_and_rendered() {
    let report = supplier_report(
        "f_articulo,cnt,total\n\
         9780134685991,2,1000\n\
         0306406152,5 3,234.50\n\
         9781492052593,4,80.004\n",
    );
    let rec = reconcile_datasets(
        &report,
        &ColumnSelection::supplier_report(),
        &invoice_dataset(),
        &invoice_columns(),
    )
    .unwrap();

    let multi = rec.records.iter().find(|r| r.key == "0306406152").unwrap();
    assert_eq!(multi.report_quantity, Some(5));
    assert!(!multi.quantity_congruent);
    assert!(multi.parse_notes.iter().any(|n| n.contains("discarded 3")));

    let rounded = rec.records.iter().find(|r| r.key == "9781492052593").unwrap();
    assert!(!rounded.price_congruent);

    let rendered = render_report(&rec, &NoLookup, &options()).unwrap();
    assert_eq!(rendered.plan.tier, ReportTier::NumericMismatchOnly);
    assert_eq!(rendered.plan.orientation, Orientation::Portrait);
    assert_eq!(page_count(&rendered.bytes), 1);
}

#[test]
fn structural_mismatch_spans_pages_in_landscape() {
    let mut csv = String::from("f_articulo,cnt,total\n");
    for i in 0..60 {
        csv.push_str(&format!("978000000{i:04},1,10\n"));
    }
    let rec = reconcile_datasets(
        &supplier_report(&csv),
        &ColumnSelection::supplier_report(),
        &invoice_dataset(),
        &invoice_columns(),
    )
    .unwrap();
    assert_eq!(rec.records.len(), 63);
    assert!(rec.records.windows(2).all(|w| w[0].key < w[1].key));

    let rendered = render_report(&rec, &NoLookup, &options()).unwrap();
    assert_eq!(rendered.plan.tier, ReportTier::StructuralMismatch);
    assert_eq!(rendered.plan.orientation, Orientation::Landscape);
    assert!(page_count(&rendered.bytes) > 1);
}

#[test]
fn key_only_mode_writes_presence_report_through_sink() {
    let report = supplier_report("f_articulo\n978-0-13-468599-1\nnot an isbn\n0306406152\n");
    let rec = reconcile_dataset_keys(&report, "f_articulo", &invoice_dataset(), "ISBN").unwrap();
    assert_eq!(rec.mode, Mode::KeysOnly);
    assert_eq!(rec.diagnostics.invalid_keys_report, 1);
    assert_eq!(rec.records.len(), 3);

    let catalog = CatalogLookup::from_json_str(r#"{"9780134685991": "Effective Java"}"#).unwrap();
    let rendered = render_report(&rec, &catalog, &options()).unwrap();
    assert_eq!(rendered.plan.tier, ReportTier::StructuralMismatch);

    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path());
    sink.commit(rendered.filename, &rendered.bytes).unwrap();
    let written = std::fs::read(dir.path().join("key_presence_report.pdf")).unwrap();
    assert_eq!(page_count(&written), 1);
}

#[test]
fn missing_quantity_column_is_reported() {
    let report = supplier_report("f_articulo,total\n9780134685991,10\n");
    let err = reconcile_datasets(
        &report,
        &ColumnSelection::supplier_report(),
        &invoice_dataset(),
        &invoice_columns(),
    )
    .unwrap_err();
    assert!(matches!(err, ConcordError::MissingColumn { .. }));
}
