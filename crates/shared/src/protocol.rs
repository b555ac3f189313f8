use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Expense;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedExpensesResponse {
    pub data: Vec<Expense>,
    pub total: u64,
    pub page: u32,
    pub last_page: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListExpensesQuery {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_response_reads_last_page_field() {
        let raw = r#"{"data":[],"total":8,"page":1,"lastPage":2}"#;
        let body: PaginatedExpensesResponse = serde_json::from_str(raw).expect("decode");
        assert_eq!(body.total, 8);
        assert_eq!(body.page, 1);
        assert_eq!(body.last_page, 2);
        assert!(body.data.is_empty());
    }

    #[test]
    fn create_request_sends_amount_as_number() {
        let body = CreateExpenseRequest {
            amount: Decimal::new(1250, 2),
            description: "Coffee".into(),
        };
        let value = serde_json::to_value(&body).expect("encode");
        assert_eq!(value["amount"].as_f64(), Some(12.5));
        assert_eq!(value["description"], "Coffee");
    }
}
