//! Pure derivations over a loaded page: ordering, filtering, totals and the
//! pagination controls a front end renders.

use std::fmt::Write as _;

use chrono::{
    format::{Item, StrftimeItems},
    DateTime, FixedOffset, Offset, Utc,
};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::domain::Expense;
use thiserror::Error;

pub const DEFAULT_DATE_PATTERN: &str = "%-m/%-d/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date pattern '{0}'")]
pub struct InvalidDatePattern(pub String);

/// How `date_recorded` is shown to the user, and therefore what the filter
/// matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDisplay {
    pattern: String,
    offset: FixedOffset,
}

impl DateDisplay {
    pub fn new(
        pattern: impl Into<String>,
        offset: FixedOffset,
    ) -> Result<Self, InvalidDatePattern> {
        let pattern = pattern.into();
        if pattern.is_empty()
            || StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error))
        {
            return Err(InvalidDatePattern(pattern));
        }
        Ok(Self { pattern, offset })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, at: &DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "{}",
            at.with_timezone(&self.offset).format(&self.pattern)
        );
        out
    }
}

impl Default for DateDisplay {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_PATTERN.to_string(),
            offset: Utc.fix(),
        }
    }
}

/// Newest first. The sort is stable, so records recorded at the same instant
/// keep the order the backend sent them in.
pub fn sort_newest_first(records: &mut [Expense]) {
    records.sort_by(|a, b| b.date_recorded.cmp(&a.date_recorded));
}

/// Records of the `page`-th slice of `limit` records. Used when the whole
/// collection is fetched and paginated locally.
pub fn slice_page(records: &[Expense], page: u32, limit: u32) -> Vec<Expense> {
    let limit = limit.max(1) as usize;
    let skip = (page.max(1) as usize - 1).saturating_mul(limit);
    records.iter().skip(skip).take(limit).cloned().collect()
}

/// Records of the loaded page that match `text`.
///
/// Matching is a case-insensitive substring test against the description,
/// the amount, and the displayed date. An empty `text` returns every record
/// without evaluating any of them.
pub fn filter_expenses<'a>(
    records: &'a [Expense],
    text: &str,
    dates: &DateDisplay,
) -> Vec<&'a Expense> {
    if text.is_empty() {
        return records.iter().collect();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|expense| expense_matches(expense, &needle, dates))
        .collect()
}

fn expense_matches(expense: &Expense, needle: &str, dates: &DateDisplay) -> bool {
    expense.description.to_lowercase().contains(needle)
        || amount_renderings(expense.amount)
            .iter()
            .any(|rendered| rendered.contains(needle))
        || dates
            .format(&expense.date_recorded)
            .to_lowercase()
            .contains(needle)
}

// Wider than the plain backend rendering: the two-decimal form lets "5.00"
// match `15.00`, and also lets "0" match every whole amount.
fn amount_renderings(amount: Decimal) -> [String; 3] {
    [
        amount.to_string(),
        amount.normalize().to_string(),
        format!("{:.2}", round_cents(amount)),
    ]
}

/// Exact sum of the amounts shown. Rounding is left to [`format_money`].
pub fn page_total<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a Expense>,
{
    records.into_iter().map(|expense| expense.amount).sum()
}

pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_cents(amount))
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    /// Page buttons, `1..=last_page`.
    pub pages: Vec<u32>,
    pub current_page: u32,
    pub last_page: u32,
    pub pages_enabled: bool,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationControls {
    pub fn new(current_page: u32, last_page: u32, loading: bool) -> Self {
        let last_page = last_page.max(1);
        Self {
            pages: (1..=last_page).collect(),
            current_page,
            last_page,
            pages_enabled: !loading,
            previous_enabled: !loading && current_page > 1,
            next_enabled: !loading && current_page < last_page,
        }
    }

    /// Controls are only drawn when there is somewhere to go.
    pub fn is_visible(&self) -> bool {
        self.last_page > 1
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
