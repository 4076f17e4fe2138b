pub mod builders;
pub mod lookup;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reconcile::ReconciliationRecord;
use crate::render::{ContentBlock, Margins, Orientation, RenderOptions};

pub use builders::plan_report;
pub use lookup::{resolve_title, CatalogLookup, NoLookup, TitleLookup};

/// Overall shape of a reconciliation, deciding which report is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTier {
    /// Every key on both sides with matching quantity and net total.
    FullyCongruent,
    /// Every key on both sides but some numbers differ.
    NumericMismatchOnly,
    /// At least one key is missing from a side.
    StructuralMismatch,
}

impl fmt::Display for ReportTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportTier::FullyCongruent => write!(f, "fully congruent"),
            ReportTier::NumericMismatchOnly => write!(f, "numeric mismatch only"),
            ReportTier::StructuralMismatch => write!(f, "structural mismatch"),
        }
    }
}

/// Pick the tier for a record set. An empty set is fully congruent.
pub fn classify(records: &[ReconciliationRecord]) -> ReportTier {
    if records.iter().all(ReconciliationRecord::is_fully_congruent) {
        ReportTier::FullyCongruent
    } else if records.iter().all(ReconciliationRecord::key_congruent) {
        ReportTier::NumericMismatchOnly
    } else {
        ReportTier::StructuralMismatch
    }
}

/// A report ready to render: blocks plus the page setup they need.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub tier: ReportTier,
    pub title: String,
    pub orientation: Orientation,
    pub margins: Margins,
    pub blocks: Vec<ContentBlock>,
}

impl ReportPlan {
    /// Apply this plan's page setup on top of `base`.
    pub fn render_options(&self, base: &RenderOptions) -> RenderOptions {
        RenderOptions {
            title: self.title.clone(),
            orientation: self.orientation,
            margins: self.margins,
            ..base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(in_report: bool, in_invoice: bool, quantity: bool, price: bool) -> ReconciliationRecord {
        ReconciliationRecord {
            key: "9780134685991".into(),
            in_report,
            in_invoice,
            quantity_congruent: quantity,
            price_congruent: price,
            report_quantity: None,
            invoice_quantity: None,
            report_total: None,
            invoice_total: None,
            report_occurrences: usize::from(in_report),
            invoice_occurrences: usize::from(in_invoice),
            notes: vec![],
            parse_notes: vec![],
        }
    }

    #[test]
    fn test_all_congruent() {
        let records = vec![record(true, true, true, true), record(true, true, true, true)];
        assert_eq!(classify(&records), ReportTier::FullyCongruent);
        assert_eq!(classify(&[]), ReportTier::FullyCongruent);
    }

    #[test]
    fn test_numeric_only() {
        let records = vec![record(true, true, true, true), record(true, true, false, true)];
        assert_eq!(classify(&records), ReportTier::NumericMismatchOnly);
    }

    #[test]
    fn test_structural_wins_over_numeric() {
        let records = vec![record(true, true, false, false), record(false, true, false, false)];
        assert_eq!(classify(&records), ReportTier::StructuralMismatch);
    }

    #[test]
    fn test_every_flag_combination_has_exactly_one_tier() {
        for bits in 0u8..16 {
            let r = record(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            let tier = classify(std::slice::from_ref(&r));
            let expected = if r.is_fully_congruent() {
                ReportTier::FullyCongruent
            } else if r.key_congruent() {
                ReportTier::NumericMismatchOnly
            } else {
                ReportTier::StructuralMismatch
            };
            assert_eq!(tier, expected, "flags {bits:04b}");
        }
    }
}
