use std::str::FromStr;

use rust_decimal::Decimal;
use shared::{domain::MAX_DESCRIPTION_CHARS, protocol::CreateExpenseRequest};

use crate::error::FormError;

/// The "new expense" inputs as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
}

impl ExpenseForm {
    pub fn new(amount: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<CreateExpenseRequest, FormError> {
        let raw_amount = self.amount.trim();
        if raw_amount.is_empty() {
            return Err(FormError::MissingAmount);
        }
        let amount = Decimal::from_str(raw_amount)
            .map_err(|_| FormError::InvalidAmount(raw_amount.to_string()))?;
        if amount <= Decimal::ZERO {
            return Err(FormError::NonPositiveAmount);
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::EmptyDescription);
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(FormError::DescriptionTooLong);
        }

        Ok(CreateExpenseRequest {
            amount,
            description: description.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.amount.clear();
        self.description.clear();
    }
}
