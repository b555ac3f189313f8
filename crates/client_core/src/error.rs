use std::fmt;

use shared::domain::{ExpenseId, MAX_DESCRIPTION_CHARS};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    ListPage,
    ListAll,
    Create,
    Delete(ExpenseId),
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListPage => write!(f, "list expenses page"),
            Self::ListAll => write!(f, "list all expenses"),
            Self::Create => write!(f, "create expense"),
            Self::Delete(id) => write!(f, "delete expense {id}"),
        }
    }
}

/// Any failed backend exchange: transport error, non-2xx status, or a body
/// that could not be decoded. Callers treat every case the same way.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {detail}")]
pub struct BackendError {
    pub operation: BackendOperation,
    pub detail: String,
}

impl BackendError {
    pub fn new(operation: BackendOperation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendSetupError {
    #[error("invalid api url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Client(reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("amount is required")]
    MissingAmount,
    #[error("amount '{0}' is not a number")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("description is required")]
    EmptyDescription,
    #[error("description is longer than {} characters", MAX_DESCRIPTION_CHARS)]
    DescriptionTooLong,
}
