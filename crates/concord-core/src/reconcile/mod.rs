pub mod values;

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConcordError;
use crate::key;
use values::{parse_amount, parse_quantity};

/// Note attached to a record that agrees on every dimension.
pub const CONGRUENT_NOTE: &str = "Congruent";

/// Separator used when notes are joined into a single cell.
pub const NOTE_SEPARATOR: &str = "; ";

/// Normalized amount substituted when a net total cannot be parsed.
pub const UNPARSABLE_TOTAL: &str = "0.0000";

/// Which comparison was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Key presence only. Quantity and price flags mirror presence.
    KeysOnly,
    /// Presence, quantity and net total.
    Extended,
}

/// Parallel columns of one source: keys, quantities and net totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceColumns {
    pub keys: Vec<String>,
    pub quantities: Vec<String>,
    pub totals: Vec<String>,
}

impl SourceColumns {
    pub fn new(keys: Vec<String>, quantities: Vec<String>, totals: Vec<String>) -> Self {
        Self {
            keys,
            quantities,
            totals,
        }
    }

    fn check_aligned(&self, source_name: &str) -> Result<(), ConcordError> {
        if self.keys.len() == self.quantities.len() && self.keys.len() == self.totals.len() {
            return Ok(());
        }
        Err(ConcordError::MisalignedColumns {
            source_name: source_name.to_string(),
            keys: self.keys.len(),
            quantities: self.quantities.len(),
            totals: self.totals.len(),
        })
    }
}

/// Reconciliation outcome for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub key: String,
    pub in_report: bool,
    pub in_invoice: bool,
    pub quantity_congruent: bool,
    pub price_congruent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_total: Option<String>,
    /// Rows carrying this key in the report.
    pub report_occurrences: usize,
    /// Rows carrying this key in the invoice.
    pub invoice_occurrences: usize,
    /// Congruence notes: "Congruent" or one note per failing dimension.
    pub notes: Vec<String>,
    /// Warnings raised while parsing this key's cells.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_notes: Vec<String>,
}

impl ReconciliationRecord {
    /// Present on both sides.
    pub fn key_congruent(&self) -> bool {
        self.in_report && self.in_invoice
    }

    pub fn is_fully_congruent(&self) -> bool {
        self.key_congruent() && self.quantity_congruent && self.price_congruent
    }

    /// Congruence notes joined with "; ".
    pub fn status_text(&self) -> String {
        self.notes.join(NOTE_SEPARATOR)
    }

    /// Congruence notes followed by parse warnings.
    pub fn notes_text(&self) -> String {
        self.notes
            .iter()
            .chain(self.parse_notes.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(NOTE_SEPARATOR)
    }
}

/// Counters describing what was dropped or degraded during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rows_report: usize,
    pub rows_invoice: usize,
    pub invalid_keys_report: usize,
    pub invalid_keys_invoice: usize,
    pub dropped_quantity_rows: usize,
    pub unparsable_totals: usize,
}

/// Column sums of one source over every row with a valid key.
///
/// Quantities count rows whose quantity parses; amounts count rows whose
/// net total parses. Duplicate keys are all included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTotals {
    pub quantity: i64,
    pub amount: Decimal,
}

/// Full result of reconciling two sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub mode: Mode,
    /// One record per key in the union of both sides, sorted by key.
    pub records: Vec<ReconciliationRecord>,
    pub diagnostics: Diagnostics,
    /// Zero in key-only mode.
    #[serde(default)]
    pub report_totals: SideTotals,
    #[serde(default)]
    pub invoice_totals: SideTotals,
}

impl Reconciliation {
    pub fn congruent_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_fully_congruent()).count()
    }
}

/// Presence reconciliation of two already-normalized key lists.
///
/// Duplicates collapse to set membership. Records are sorted by key.
pub fn reconcile_key_sets<S: AsRef<str>>(keys_report: &[S], keys_invoice: &[S]) -> Reconciliation {
    let report = count_occurrences(keys_report);
    let invoice = count_occurrences(keys_invoice);

    let union: BTreeSet<&str> = report.keys().chain(invoice.keys()).copied().collect();
    let records = union
        .into_iter()
        .map(|k| {
            let report_occurrences = report.get(k).copied().unwrap_or(0);
            let invoice_occurrences = invoice.get(k).copied().unwrap_or(0);
            let in_report = report_occurrences > 0;
            let in_invoice = invoice_occurrences > 0;
            let present = in_report && in_invoice;
            ReconciliationRecord {
                key: k.to_string(),
                in_report,
                in_invoice,
                quantity_congruent: present,
                price_congruent: present,
                report_quantity: None,
                invoice_quantity: None,
                report_total: None,
                invoice_total: None,
                report_occurrences,
                invoice_occurrences,
                notes: status_notes(in_report, in_invoice, None),
                parse_notes: Vec::new(),
            }
        })
        .collect();

    Reconciliation {
        mode: Mode::KeysOnly,
        records,
        diagnostics: Diagnostics {
            rows_report: keys_report.len(),
            rows_invoice: keys_invoice.len(),
            ..Diagnostics::default()
        },
        report_totals: SideTotals::default(),
        invoice_totals: SideTotals::default(),
    }
}

/// Presence reconciliation of two raw key columns.
///
/// Cells that do not clean to a valid key are dropped and counted.
pub fn reconcile_keys<S: AsRef<str>>(column_report: &[S], column_invoice: &[S]) -> Reconciliation {
    let report = key::extract_valid_keys(column_report);
    let invoice = key::extract_valid_keys(column_invoice);
    if report.rejected > 0 || invoice.rejected > 0 {
        debug!(
            report = report.rejected,
            invoice = invoice.rejected,
            "dropped cells without a valid key"
        );
    }

    let mut reconciliation = reconcile_key_sets(&report.keys, &invoice.keys);
    reconciliation.diagnostics.rows_report = column_report.len();
    reconciliation.diagnostics.rows_invoice = column_invoice.len();
    reconciliation.diagnostics.invalid_keys_report = report.rejected;
    reconciliation.diagnostics.invalid_keys_invoice = invoice.rejected;
    reconciliation
}

/// Reconcile presence, quantity and net total per key.
///
/// For each side and key the first row whose quantity parses supplies both
/// the quantity and the net total. Rows whose quantity does not parse are
/// left out of the numeric comparison but the key still counts as present.
/// Side totals sum every parsable row, duplicates included.
pub fn reconcile_extended(
    report: &SourceColumns,
    invoice: &SourceColumns,
) -> Result<Reconciliation, ConcordError> {
    report.check_aligned("report")?;
    invoice.check_aligned("invoice")?;

    let mut diagnostics = Diagnostics {
        rows_report: report.keys.len(),
        rows_invoice: invoice.keys.len(),
        ..Diagnostics::default()
    };
    let (report_side, report_totals) = collect_side(report, Side::Report, &mut diagnostics);
    let (invoice_side, invoice_totals) = collect_side(invoice, Side::Invoice, &mut diagnostics);

    let union: BTreeSet<&String> = report_side.keys().chain(invoice_side.keys()).collect();
    let records = union
        .into_iter()
        .map(|k| build_record(k, report_side.get(k), invoice_side.get(k)))
        .collect::<Vec<_>>();

    debug!(
        records = records.len(),
        dropped_quantity_rows = diagnostics.dropped_quantity_rows,
        unparsable_totals = diagnostics.unparsable_totals,
        "extended reconciliation complete"
    );

    Ok(Reconciliation {
        mode: Mode::Extended,
        records,
        diagnostics,
        report_totals,
        invoice_totals,
    })
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Report,
    Invoice,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Report => "report",
            Side::Invoice => "invoice",
        }
    }
}

#[derive(Debug, Default)]
struct SideEntry {
    occurrences: usize,
    quantity: Option<i64>,
    total: Option<String>,
    notes: Vec<String>,
}

fn collect_side(
    columns: &SourceColumns,
    side: Side,
    diagnostics: &mut Diagnostics,
) -> (BTreeMap<String, SideEntry>, SideTotals) {
    let mut entries: BTreeMap<String, SideEntry> = BTreeMap::new();
    let mut totals = SideTotals::default();
    let label = side.label();

    for ((raw_key, raw_quantity), raw_total) in columns
        .keys
        .iter()
        .zip(&columns.quantities)
        .zip(&columns.totals)
    {
        let Some(k) = key::normalize(raw_key) else {
            match side {
                Side::Report => diagnostics.invalid_keys_report += 1,
                Side::Invoice => diagnostics.invalid_keys_invoice += 1,
            }
            continue;
        };

        let quantity = parse_quantity(raw_quantity);
        let amount = parse_amount(raw_total);
        if let Ok(parsed) = &quantity {
            totals.quantity = totals.quantity.saturating_add(parsed.value);
        }
        if let Ok(value) = &amount {
            match totals.amount.checked_add(*value) {
                Some(sum) => totals.amount = sum,
                None => warn!(side = label, key = %raw_key, total = %raw_total, "net total overflows the side total, left out"),
            }
        }

        let entry = entries.entry(k).or_default();
        entry.occurrences += 1;
        if entry.quantity.is_some() {
            continue;
        }

        let parsed = match quantity {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(side = label, key = %raw_key, quantity = %raw_quantity, "quantity is not an integer, row left out of comparison");
                diagnostics.dropped_quantity_rows += 1;
                entry.notes.push(format!(
                    "{label} quantity '{}' is not an integer; row not compared",
                    raw_quantity.trim()
                ));
                continue;
            }
        };
        if let Some(note) = parsed.discard_note(raw_quantity) {
            entry.notes.push(format!("{label} {note}"));
        }
        entry.quantity = Some(parsed.value);

        let total = match amount {
            Ok(total) => total.to_string(),
            Err(_) => {
                warn!(side = label, key = %raw_key, total = %raw_total, "net total is not a number, using zero");
                diagnostics.unparsable_totals += 1;
                entry.notes.push(format!(
                    "{label} net total '{}' is not a number; compared as {UNPARSABLE_TOTAL}",
                    raw_total.trim()
                ));
                UNPARSABLE_TOTAL.to_string()
            }
        };
        entry.total = Some(total);
    }

    (entries, totals)
}

fn build_record(
    k: &str,
    report: Option<&SideEntry>,
    invoice: Option<&SideEntry>,
) -> ReconciliationRecord {
    let in_report = report.is_some();
    let in_invoice = invoice.is_some();
    let report_quantity = report.and_then(|e| e.quantity);
    let invoice_quantity = invoice.and_then(|e| e.quantity);
    let report_total = report.and_then(|e| e.total.clone());
    let invoice_total = invoice.and_then(|e| e.total.clone());

    let quantity_congruent = matches!((report_quantity, invoice_quantity), (Some(a), Some(b)) if a == b);
    let price_congruent = matches!((&report_total, &invoice_total), (Some(a), Some(b)) if a == b);

    let numeric = (in_report && in_invoice).then(|| NumericStatus {
        quantity: (!quantity_congruent).then(|| {
            format!(
                "Quantity differs: report = {} ; invoice = {}",
                display_or_na(report_quantity.map(|q| q.to_string())),
                display_or_na(invoice_quantity.map(|q| q.to_string())),
            )
        }),
        total: (!price_congruent).then(|| {
            format!(
                "Net total differs: report = {} ; invoice = {}",
                display_or_na(report_total.clone()),
                display_or_na(invoice_total.clone()),
            )
        }),
    });

    let parse_notes = report
        .into_iter()
        .chain(invoice)
        .flat_map(|e| e.notes.iter().cloned())
        .collect();

    ReconciliationRecord {
        key: k.to_string(),
        in_report,
        in_invoice,
        quantity_congruent,
        price_congruent,
        notes: status_notes(in_report, in_invoice, numeric),
        report_quantity,
        invoice_quantity,
        report_total,
        invoice_total,
        report_occurrences: report.map_or(0, |e| e.occurrences),
        invoice_occurrences: invoice.map_or(0, |e| e.occurrences),
        parse_notes,
    }
}

struct NumericStatus {
    quantity: Option<String>,
    total: Option<String>,
}

fn status_notes(in_report: bool, in_invoice: bool, numeric: Option<NumericStatus>) -> Vec<String> {
    let mut notes = Vec::new();
    if !in_report {
        notes.push("Key missing from report".to_string());
    }
    if !in_invoice {
        notes.push("Key missing from invoice".to_string());
    }
    if let Some(numeric) = numeric {
        notes.extend(numeric.quantity);
        notes.extend(numeric.total);
    }
    if notes.is_empty() {
        notes.push(CONGRUENT_NOTE.to_string());
    }
    notes
}

fn display_or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "n/a".to_string())
}

fn count_occurrences<S: AsRef<str>>(keys: &[S]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for k in keys {
        *counts.entry(k.as_ref()).or_insert(0) += 1;
    }
    counts
}
