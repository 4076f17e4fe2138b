use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ConcordError;
use crate::reconcile::{Mode, Reconciliation, ReconciliationRecord};
use crate::render::{ContentBlock, Margins, Orientation};
use crate::report::lookup::{resolve_title, TitleLookup};
use crate::report::{classify, ReportPlan, ReportTier};

const CONGRUENT: &str = "Congruent";
const INCONGRUENT: &str = "Incongruent";
const PRESENT: &str = "OK";
const ABSENT: &str = "N/A";
const NOT_EVALUATED: &str = "-";

const TITLE_LOOKUP_DISCLAIMER: &str = "* Note: titles are looked up from an external catalog \
and may be missing or inaccurate. They are informative only and play no part in the comparison.";

/// Build the report for a reconciliation, picking the layout by tier.
///
/// Key-only reconciliations always get the presence report; the tier only
/// shows up in its title.
pub fn plan_report(
    reconciliation: &Reconciliation,
    lookup: &dyn TitleLookup,
) -> Result<ReportPlan, ConcordError> {
    let tier = classify(&reconciliation.records);
    debug!(%tier, mode = ?reconciliation.mode, records = reconciliation.records.len(), "planning report");
    match reconciliation.mode {
        Mode::KeysOnly => presence_report(reconciliation, lookup),
        Mode::Extended => match tier {
            ReportTier::FullyCongruent => congruent_report(reconciliation),
            ReportTier::NumericMismatchOnly => numeric_mismatch_report(&reconciliation.records),
            ReportTier::StructuralMismatch => structural_mismatch_report(&reconciliation.records),
        },
    }
}

/// Suggested file name for a rendered report.
pub fn default_filename(plan: &ReportPlan, mode: Mode) -> &'static str {
    match (mode, plan.tier) {
        (Mode::KeysOnly, _) => "key_presence_report.pdf",
        (Mode::Extended, ReportTier::FullyCongruent) => "congruence_full_report.pdf",
        (Mode::Extended, ReportTier::NumericMismatchOnly) => "numeric_mismatch_report.pdf",
        (Mode::Extended, ReportTier::StructuralMismatch) => "structural_mismatch_report.pdf",
    }
}

/// Totals come from the report side's column sums, so duplicate rows of a
/// key are counted even though only the first one is compared.
pub fn congruent_report(reconciliation: &Reconciliation) -> Result<ReportPlan, ConcordError> {
    let rows = reconciliation
        .records
        .iter()
        .map(|r| {
            vec![
                r.key.clone(),
                r.report_quantity.map(|q| q.to_string()).unwrap_or_default(),
                r.report_total.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let totals = reconciliation.report_totals;

    Ok(ReportPlan {
        tier: ReportTier::FullyCongruent,
        title: "Congruence results".into(),
        orientation: Orientation::Portrait,
        margins: Margins::default(),
        blocks: vec![
            ContentBlock::text("The report and the invoice contain the same data."),
            ContentBlock::table(columns(&["ISBN", "QUANTITY", "NET TOTAL"]), rows)?,
            ContentBlock::text(format!(
                "Total quantity: {} | Total net amount: {}",
                totals.quantity,
                format_currency(totals.amount)
            )),
        ],
    })
}

pub fn numeric_mismatch_report(
    records: &[ReconciliationRecord],
) -> Result<ReportPlan, ConcordError> {
    let rows = records
        .iter()
        .filter(|r| !r.quantity_congruent || !r.price_congruent)
        .map(|r| {
            vec![
                r.key.clone(),
                congruence_label(r.quantity_congruent).into(),
                congruence_label(r.price_congruent).into(),
                r.notes_text(),
            ]
        })
        .collect();

    Ok(ReportPlan {
        tier: ReportTier::NumericMismatchOnly,
        title: "Congruence results: numeric discrepancies".into(),
        orientation: Orientation::Portrait,
        margins: Margins::default(),
        blocks: vec![ContentBlock::table(
            columns(&["ISBN", "QUANTITY", "NET TOTAL", "NOTES"]),
            rows,
        )?],
    })
}

pub fn structural_mismatch_report(
    records: &[ReconciliationRecord],
) -> Result<ReportPlan, ConcordError> {
    let rows = records
        .iter()
        .map(|r| {
            let evaluated = r.key_congruent();
            let status = |congruent: bool| {
                if evaluated {
                    congruence_label(congruent)
                } else {
                    NOT_EVALUATED
                }
            };
            vec![
                r.key.clone(),
                presence_label(r.in_report).into(),
                presence_label(r.in_invoice).into(),
                status(r.quantity_congruent).into(),
                status(r.price_congruent).into(),
                r.notes_text(),
            ]
        })
        .collect();

    Ok(ReportPlan {
        tier: ReportTier::StructuralMismatch,
        title: "Congruence results: multiple discrepancies".into(),
        orientation: Orientation::Landscape,
        margins: Margins::new(50.0, 50.0, 70.0, 50.0),
        blocks: vec![ContentBlock::table(
            columns(&["ISBN", "IN REPORT", "IN INVOICE", "QUANTITY", "NET TOTAL", "NOTES"]),
            rows,
        )?],
    })
}

/// Presence-only report with a title column resolved through `lookup`.
pub fn presence_report(
    reconciliation: &Reconciliation,
    lookup: &dyn TitleLookup,
) -> Result<ReportPlan, ConcordError> {
    let tier = classify(&reconciliation.records);
    let rows = reconciliation
        .records
        .iter()
        .map(|r| {
            vec![
                r.key.clone(),
                yes_no(r.in_report).into(),
                yes_no(r.in_invoice).into(),
                congruence_label(r.key_congruent()).into(),
                resolve_title(lookup, &r.key),
            ]
        })
        .collect();

    Ok(ReportPlan {
        tier,
        title: format!("Key presence analysis ({tier})"),
        orientation: Orientation::Portrait,
        margins: Margins::default(),
        blocks: vec![
            ContentBlock::table(columns(&["ISBN", "SOURCE A", "SOURCE B", "STATUS", "TITLE"]), rows)?,
            ContentBlock::text(TITLE_LOOKUP_DISCLAIMER),
        ],
    })
}

/// Format an amount as dollars with thousands separators: `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{frac_part}")
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn congruence_label(congruent: bool) -> &'static str {
    if congruent {
        CONGRUENT
    } else {
        INCONGRUENT
    }
}

fn presence_label(present: bool) -> &'static str {
    if present {
        PRESENT
    } else {
        ABSENT
    }
}

fn yes_no(present: bool) -> &'static str {
    if present {
        "Yes"
    } else {
        "No"
    }
}
