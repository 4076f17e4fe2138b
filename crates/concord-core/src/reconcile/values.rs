use crate::error::ConcordError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places amounts are normalized to before comparison.
pub const AMOUNT_SCALE: u32 = 4;

/// A quantity read from a cell, with any extra tokens that were ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuantity {
    pub value: i64,
    pub discarded: Vec<String>,
}

impl ParsedQuantity {
    /// Informational note when the cell held more than one token.
    pub fn discard_note(&self, raw: &str) -> Option<String> {
        if self.discarded.is_empty() {
            return None;
        }
        Some(format!(
            "quantity cell '{}' has several values; used {}, discarded {}",
            raw.trim(),
            self.value,
            self.discarded.join(" ")
        ))
    }
}

/// Parse a quantity cell.
///
/// Handles formats like:
/// - "5" -> 5
/// - "5 3" -> 5, discarding "3"
/// - "", "abc", "2.5", "4.0" -> NumericParseFailure
pub fn parse_quantity(cell: &str) -> Result<ParsedQuantity, ConcordError> {
    let mut tokens = cell.split_whitespace();
    let first = tokens.next().ok_or_else(|| ConcordError::NumericParseFailure {
        value: cell.to_string(),
    })?;

    let value = first
        .parse::<i64>()
        .map_err(|_| ConcordError::NumericParseFailure {
            value: cell.to_string(),
        })?;

    Ok(ParsedQuantity {
        value,
        discarded: tokens.map(str::to_string).collect(),
    })
}

/// Normalize a monetary amount to its 4-decimal string form.
///
/// Every character except digits and '.' is stripped first, so "$1,200.5"
/// becomes "1200.5000". Two amounts are congruent iff their normalized
/// strings are equal.
pub fn normalize_amount(cell: &str) -> Result<String, ConcordError> {
    parse_amount(cell).map(|amount| amount.to_string())
}

/// Parse a monetary amount, rounded half away from zero to exactly
/// [`AMOUNT_SCALE`] decimal places.
///
/// Values too large to carry four decimals fail with `NumericParseFailure`.
pub fn parse_amount(cell: &str) -> Result<Decimal, ConcordError> {
    let failure = || ConcordError::NumericParseFailure {
        value: cell.to_string(),
    };
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value = Decimal::from_str(&cleaned).map_err(|_| failure())?;

    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    if rounded.scale() != AMOUNT_SCALE {
        return Err(failure());
    }
    Ok(rounded)
}
