use std::fmt::Write as _;

use client_core::{format_money, DateDisplay, ExpenseListSnapshot, PaginationControls};
use shared::domain::MAX_DESCRIPTION_CHARS;

/// Draws one frame of the expense list as plain text.
pub fn render(snapshot: &ExpenseListSnapshot, dates: &DateDisplay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Expense tracker ==");
    let _ = writeln!(
        out,
        "new expense: amount [{}] description [{}]",
        snapshot.form.amount, snapshot.form.description
    );

    if snapshot.loading {
        let _ = writeln!(out, "Loading expenses...");
    } else {
        let _ = writeln!(
            out,
            "Total (current page): {}",
            format_money(snapshot.page_total)
        );
        let _ = writeln!(out, "Records in database: {}", snapshot.total);
    }

    if !snapshot.filter.is_empty() {
        let _ = writeln!(out, "Filter: \"{}\" (type 'clear' to reset)", snapshot.filter);
    }

    let _ = writeln!(
        out,
        "-- My expenses (page {} of {}) --",
        snapshot.current_page, snapshot.last_page
    );
    if snapshot.loading {
        let _ = writeln!(out, "Loading expense list...");
    } else if snapshot.filtered.is_empty() && !snapshot.filter.is_empty() {
        let _ = writeln!(out, "No expenses on this page match the filter.");
    } else if snapshot.total == 0 {
        let _ = writeln!(out, "No expenses recorded yet. Start adding some!");
    } else {
        for expense in &snapshot.filtered {
            let _ = writeln!(
                out,
                "#{:<6} {:>12}  {:<width$}  {}",
                expense.id,
                format_money(expense.amount),
                expense.description,
                dates.format(&expense.date_recorded),
                width = MAX_DESCRIPTION_CHARS
            );
        }
    }

    if snapshot.controls.is_visible() {
        let _ = writeln!(out, "{}", pagination_line(&snapshot.controls));
    }
    out
}

fn pagination_line(controls: &PaginationControls) -> String {
    let mut parts = Vec::with_capacity(controls.pages.len() + 2);
    parts.push(toggle("< prev", controls.previous_enabled));
    for page in &controls.pages {
        let label = if *page == controls.current_page {
            format!("[{page}]")
        } else {
            page.to_string()
        };
        parts.push(toggle(&label, controls.pages_enabled));
    }
    parts.push(toggle("next >", controls.next_enabled));
    parts.join(" ")
}

// Disabled controls are bracketed with dashes so they read as inert.
fn toggle(label: &str, enabled: bool) -> String {
    if enabled {
        label.to_string()
    } else {
        format!("-{label}-")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use client_core::ExpenseForm;
    use rust_decimal::Decimal;
    use shared::domain::{Expense, ExpenseId};

    use super::*;

    fn snapshot(
        records: Vec<Expense>,
        total: u64,
        current_page: u32,
        last_page: u32,
    ) -> ExpenseListSnapshot {
        let page_total = records.iter().map(|expense| expense.amount).sum();
        ExpenseListSnapshot {
            filtered: records.clone(),
            records,
            page_total,
            total,
            current_page,
            last_page,
            items_per_page: 5,
            filter: String::new(),
            loading: false,
            form: ExpenseForm::default(),
            controls: PaginationControls::new(current_page, last_page, false),
        }
    }

    fn coffee() -> Expense {
        Expense {
            id: ExpenseId(3),
            amount: Decimal::new(1250, 2),
            description: "Coffee".into(),
            date_recorded: Utc.with_ymd_and_hms(2024, 6, 9, 8, 15, 0).unwrap(),
        }
    }

    #[test]
    fn shows_page_total_record_count_and_rows() {
        let frame = render(&snapshot(vec![coffee()], 8, 1, 2), &DateDisplay::default());
        assert!(frame.contains("Total (current page): $12.50"));
        assert!(frame.contains("Records in database: 8"));
        assert!(frame.contains("page 1 of 2"));
        assert!(frame.contains("#3"));
        assert!(frame.contains("6/9/2024"));
        assert!(frame.contains("-< prev- [1] 2 next >"));
    }

    #[test]
    fn hides_pagination_for_single_page() {
        let frame = render(&snapshot(vec![coffee()], 1, 1, 1), &DateDisplay::default());
        assert!(!frame.contains("prev"));
    }

    #[test]
    fn empty_states() {
        let empty = render(&snapshot(Vec::new(), 0, 1, 1), &DateDisplay::default());
        assert!(empty.contains("No expenses recorded yet"));

        let mut filtered = snapshot(vec![coffee()], 1, 1, 1);
        filtered.filter = "tea".into();
        filtered.filtered.clear();
        let frame = render(&filtered, &DateDisplay::default());
        assert!(frame.contains("No expenses on this page match the filter."));
        assert!(frame.contains("Filter: \"tea\""));
    }

    #[test]
    fn loading_replaces_totals_and_list() {
        let mut loading = snapshot(vec![coffee()], 1, 1, 1);
        loading.loading = true;
        let frame = render(&loading, &DateDisplay::default());
        assert!(frame.contains("Loading expenses..."));
        assert!(!frame.contains("Total (current page)"));
        assert!(!frame.contains("Coffee"));
    }
}
