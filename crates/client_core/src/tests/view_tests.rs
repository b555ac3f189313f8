use super::*;
use chrono::TimeZone;
use shared::domain::ExpenseId;

fn expense(id: i64, cents: i64, description: &str, day: u32) -> Expense {
    Expense {
        id: ExpenseId(id),
        amount: Decimal::new(cents, 2),
        description: description.to_string(),
        date_recorded: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
    }
}

fn ids(records: &[&Expense]) -> Vec<i64> {
    records.iter().map(|expense| expense.id.0).collect()
}

#[test]
fn sorts_newest_first_and_keeps_ties_in_backend_order() {
    let mut records = vec![
        expense(1, 100, "a", 1),
        expense(2, 100, "b", 3),
        expense(3, 100, "c", 2),
        expense(4, 100, "d", 3),
    ];
    sort_newest_first(&mut records);
    let order: Vec<i64> = records.iter().map(|expense| expense.id.0).collect();
    assert_eq!(order, vec![2, 4, 3, 1]);
    assert!(records
        .windows(2)
        .all(|pair| pair[0].date_recorded >= pair[1].date_recorded));
}

#[test]
fn empty_filter_returns_page_unchanged() {
    let records = vec![expense(1, 300, "Taxi", 1), expense(2, 1500, "Dinner", 2)];
    let filtered = filter_expenses(&records, "", &DateDisplay::default());
    assert_eq!(ids(&filtered), vec![1, 2]);
}

#[test]
fn filter_matches_description_case_insensitively() {
    let records = vec![expense(1, 300, "Morning COFFEE", 1), expense(2, 1500, "Dinner", 2)];
    let filtered = filter_expenses(&records, "coffee", &DateDisplay::default());
    assert_eq!(ids(&filtered), vec![1]);
}

#[test]
fn filter_matches_two_decimal_amount_rendering() {
    let records = vec![expense(1, 1500, "Dinner", 1), expense(2, 300, "Taxi", 2)];
    let filtered = filter_expenses(&records, "5.00", &DateDisplay::default());
    assert_eq!(ids(&filtered), vec![1]);
}

#[test]
fn filter_matches_normalized_amount_rendering() {
    let records = vec![Expense {
        amount: Decimal::new(155, 1),
        ..expense(1, 0, "Lunch", 1)
    }];
    assert_eq!(filter_expenses(&records, "15.5", &DateDisplay::default()).len(), 1);
    assert_eq!(filter_expenses(&records, "15.50", &DateDisplay::default()).len(), 1);
}

#[test]
fn filter_matches_displayed_date() {
    let records = vec![expense(1, 100, "a", 7), expense(2, 100, "b", 8)];
    let filtered = filter_expenses(&records, "5/8/2024", &DateDisplay::default());
    assert_eq!(ids(&filtered), vec![2]);

    let iso = DateDisplay::new("%Y-%m-%d", Utc.fix()).expect("pattern");
    let filtered = filter_expenses(&records, "2024-05-07", &iso);
    assert_eq!(ids(&filtered), vec![1]);
}

#[test]
fn filter_is_idempotent() {
    let records = vec![
        expense(1, 1500, "Dinner", 1),
        expense(2, 300, "dinner tip", 2),
        expense(3, 900, "Books", 3),
    ];
    let dates = DateDisplay::default();
    let once: Vec<Expense> = filter_expenses(&records, "dinner", &dates)
        .into_iter()
        .cloned()
        .collect();
    let twice = filter_expenses(&once, "dinner", &dates);
    assert_eq!(ids(&twice), vec![1, 2]);
}

#[test]
fn date_display_applies_offset() {
    let late = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
    let plus_two = FixedOffset::east_opt(2 * 3600).expect("offset");
    let display = DateDisplay::new(DEFAULT_DATE_PATTERN, plus_two).expect("pattern");
    assert_eq!(display.format(&late), "5/2/2024");
}

#[test]
fn rejects_unusable_date_patterns() {
    assert!(DateDisplay::new("", Utc.fix()).is_err());
    assert!(DateDisplay::new("%Q", Utc.fix()).is_err());
}

#[test]
fn total_is_exact_and_rounded_only_for_display() {
    let records = vec![
        Expense {
            amount: Decimal::new(1005, 3),
            ..expense(1, 0, "a", 1)
        },
        Expense {
            amount: Decimal::new(1005, 3),
            ..expense(2, 0, "b", 1)
        },
    ];
    let total = page_total(&records);
    assert_eq!(total, Decimal::new(2010, 3));
    assert_eq!(format_money(total), "$2.01");
    assert_eq!(format_money(Decimal::new(1005, 3)), "$1.01");
    assert_eq!(format_money(Decimal::ZERO), "$0.00");
}

#[test]
fn slice_page_returns_requested_window() {
    let records: Vec<Expense> = (1..=7).map(|id| expense(id, 100, "x", 1)).collect();
    let second: Vec<i64> = slice_page(&records, 2, 3).iter().map(|e| e.id.0).collect();
    assert_eq!(second, vec![4, 5, 6]);
    assert_eq!(slice_page(&records, 3, 3).len(), 1);
    assert!(slice_page(&records, 4, 3).is_empty());
}

#[test]
fn pagination_controls_disable_edges_and_loading() {
    let controls = PaginationControls::new(1, 2, false);
    assert_eq!(controls.pages, vec![1, 2]);
    assert!(controls.is_visible());
    assert!(!controls.previous_enabled);
    assert!(controls.next_enabled);

    let last = PaginationControls::new(2, 2, false);
    assert!(last.previous_enabled);
    assert!(!last.next_enabled);

    let busy = PaginationControls::new(2, 3, true);
    assert!(!busy.pages_enabled);
    assert!(!busy.previous_enabled);
    assert!(!busy.next_enabled);

    assert!(!PaginationControls::new(1, 0, false).is_visible());
}
