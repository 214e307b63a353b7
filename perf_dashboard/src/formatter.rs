use std::collections::BTreeMap;

use crate::data::CellValue;

/// Display rule for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatRule {
    /// Raw value, stringified.
    #[default]
    Identity,
    /// Two decimals followed by `%`.
    Percentage,
    /// Two decimals.
    Fixed2,
}

impl FormatRule {
    pub fn apply(self, value: &CellValue) -> String {
        match self {
            FormatRule::Identity => value.to_string(),
            FormatRule::Percentage => match value.as_f64() {
                Some(n) => format!("{}%", to_fixed(n, 2)),
                None => passthrough(value),
            },
            FormatRule::Fixed2 => match value.as_f64() {
                Some(n) => to_fixed(n, 2),
                None => passthrough(value),
            },
        }
    }
}

fn passthrough(value: &CellValue) -> String {
    log::trace!("Cannot round non-numeric value '{}', keeping it as is", value);
    value.to_string()
}

/// Enough fractional digits to print any `f64` exactly.
const EXACT_FRACTION_DIGITS: usize = 1100;

/// Formats `value` with exactly `digits` decimals.
///
/// Rounding works on the exact binary value: `2.675` is stored slightly
/// below the tie and gives `2.67`, while exact ties round away from zero
/// (`0.125` → `0.13`). Values of magnitude 1e21 and above and non-finite
/// values are returned unrounded.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return CellValue::Number(value).to_string();
    }

    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    match round_exact_tie_up(magnitude, digits) {
        Some(rounded) => format!("{}{}", sign, rounded),
        // Not a tie: the standard formatter rounds the exact value to nearest
        None => format!("{}{:.*}", sign, digits, magnitude),
    }
}

/// `magnitude` rounded up to `digits` decimals if it lies exactly halfway
/// between two candidates, `None` otherwise.
fn round_exact_tie_up(magnitude: f64, digits: usize) -> Option<String> {
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, magnitude);
    let (int_part, fraction) = exact.split_once('.')?;
    let (kept, rest) = fraction.split_at(digits.min(fraction.len()));

    let mut rest = rest.bytes();
    if rest.next() != Some(b'5') || !rest.all(|b| b == b'0') {
        return None;
    }

    let mut number: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
    let mut carry = true;
    for digit in number.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        number.insert(0, b'1');
    }

    let split = number.len() - kept.len();
    let (int_digits, frac_digits) = number.split_at(split);
    let int_digits = String::from_utf8_lossy(int_digits);
    if frac_digits.is_empty() {
        Some(int_digits.into_owned())
    } else {
        Some(format!("{}.{}", int_digits, String::from_utf8_lossy(frac_digits)))
    }
}

/// Per-report-type mapping from column index to display rule.
///
/// Columns without a declared rule are shown verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnFormatter {
    rules: BTreeMap<usize, FormatRule>,
}

impl ColumnFormatter {
    /// Formatter that shows every column verbatim.
    pub fn identity() -> Self {
        ColumnFormatter::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = (usize, FormatRule)>) -> Self {
        ColumnFormatter {
            rules: rules
                .into_iter()
                .filter(|(_, rule)| *rule != FormatRule::Identity)
                .collect(),
        }
    }

    /// Statistics table: error percentage, then rounded response times,
    /// throughput and network rates. Sample counts, min and max stay verbatim.
    pub fn summary() -> Self {
        let fixed = [4, 7, 8, 9, 10, 11, 12, 13]
            .into_iter()
            .map(|col| (col, FormatRule::Fixed2));
        ColumnFormatter::from_rules(std::iter::once((3, FormatRule::Percentage)).chain(fixed))
    }

    /// Error breakdown: both share columns are percentages.
    pub fn errors() -> Self {
        ColumnFormatter::from_rules([(2, FormatRule::Percentage), (3, FormatRule::Percentage)])
    }

    /// Top-5 errors by sampler: everything verbatim.
    pub fn top_errors() -> Self {
        ColumnFormatter::identity()
    }

    pub fn rule(&self, column: usize) -> FormatRule {
        self.rules.get(&column).copied().unwrap_or_default()
    }

    pub fn format(&self, column: usize, value: &CellValue) -> String {
        self.rule(column).apply(value)
    }

    /// Rule table for the same columns after removing the columns at
    /// `removed` (sorted, ascending): rules of removed columns are dropped,
    /// the remaining ones shift left.
    pub fn without_columns(&self, removed: &[usize]) -> Self {
        ColumnFormatter {
            rules: self
                .rules
                .iter()
                .filter_map(|(&col, &rule)| {
                    crate::columns::remap_index(col, removed).map(|new_col| (new_col, rule))
                })
                .collect(),
        }
    }
}
