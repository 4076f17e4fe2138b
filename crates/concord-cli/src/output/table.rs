use concord_core::reconcile::{Mode, Reconciliation};
use concord_core::report::classify;
use concord_core::tables::RawTable;

pub fn format_tables(tables: &[RawTable]) -> String {
    if tables.is_empty() {
        return "No tables found.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{:<8}  {:>5}  {:>7}  First row\n", "Table", "Rows", "Columns"));
    for table in tables {
        let first_row = table
            .rows()
            .first()
            .map(|r| r.join(" | "))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<8}  {:>5}  {:>7}  {}\n",
            table.id().to_string(),
            table.row_count(),
            table.column_count(),
            truncate(&first_row, 60)
        ));
    }
    out.push_str(&format!("\n{} table(s)", tables.len()));
    out
}

pub fn format_reconciliation(reconciliation: &Reconciliation) -> String {
    let records = &reconciliation.records;
    let mut out = String::new();

    let tier = classify(records);
    out.push_str(&format!(
        "=== {} of {} key(s) congruent: {} ===\n\n",
        reconciliation.congruent_count(),
        records.len(),
        tier
    ));

    let flag = |b: bool| if b { "yes" } else { "no" };
    match reconciliation.mode {
        Mode::KeysOnly => {
            out.push_str(&format!("  {:<13}  {:<6}  {:<7}  Status\n", "ISBN", "Report", "Invoice"));
            for r in records {
                out.push_str(&format!(
                    "  {:<13}  {:<6}  {:<7}  {}\n",
                    r.key,
                    flag(r.in_report),
                    flag(r.in_invoice),
                    r.status_text()
                ));
            }
        }
        Mode::Extended => {
            out.push_str(&format!(
                "  {:<13}  {:<6}  {:<7}  {:<8}  {:<9}  Notes\n",
                "ISBN", "Report", "Invoice", "Quantity", "Net total"
            ));
            for r in records {
                out.push_str(&format!(
                    "  {:<13}  {:<6}  {:<7}  {:<8}  {:<9}  {}\n",
                    r.key,
                    flag(r.in_report),
                    flag(r.in_invoice),
                    flag(r.quantity_congruent),
                    flag(r.price_congruent),
                    r.notes_text()
                ));
            }
        }
    }

    let d = &reconciliation.diagnostics;
    if d.invalid_keys_report + d.invalid_keys_invoice > 0 {
        out.push_str(&format!(
            "\n  {} report row(s) and {} invoice row(s) skipped: no valid ISBN\n",
            d.invalid_keys_report, d.invalid_keys_invoice
        ));
    }
    if d.dropped_quantity_rows > 0 {
        out.push_str(&format!(
            "  {} row(s) with an unreadable quantity left out of the comparison\n",
            d.dropped_quantity_rows
        ));
    }
    if d.unparsable_totals > 0 {
        out.push_str(&format!(
            "  {} net total(s) could not be read and were compared as zero\n",
            d.unparsable_totals
        ));
    }

    out.trim_end().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
