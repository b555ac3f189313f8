use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Expense, ExpenseId},
    protocol::{CreateExpenseRequest, ListExpensesQuery, PaginatedExpensesResponse},
};
use tracing::debug;
use url::Url;

use crate::error::{BackendError, BackendOperation, BackendSetupError};

const EXPENSES_PATH: &str = "api/expenses";

/// The REST collaborator the controller drives.
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    async fn list_page(
        &self,
        query: ListExpensesQuery,
    ) -> Result<PaginatedExpensesResponse, BackendError>;
    async fn list_all(&self) -> Result<Vec<Expense>, BackendError>;
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<(), BackendError>;
    async fn delete_expense(&self, id: ExpenseId) -> Result<(), BackendError>;
}

pub struct HttpExpenseBackend {
    http: Client,
    expenses_url: Url,
}

impl HttpExpenseBackend {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, BackendSetupError> {
        let expenses_url = expenses_url(api_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendSetupError::Client)?;
        Ok(Self { http, expenses_url })
    }

    pub fn expenses_url(&self) -> &Url {
        &self.expenses_url
    }

    fn expense_url(&self, id: ExpenseId) -> Url {
        let mut url = self.expenses_url.clone();
        // http(s) urls always have a path to extend.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    async fn send(
        &self,
        operation: BackendOperation,
        request: RequestBuilder,
    ) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::new(operation, err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                operation,
                format!("HTTP error status {}", status.as_u16()),
            ));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        operation: BackendOperation,
        response: Response,
    ) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|err| BackendError::new(operation, format!("malformed response: {err}")))
    }
}

fn expenses_url(api_url: &str) -> Result<Url, BackendSetupError> {
    let trimmed = api_url.trim();
    let base = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let base = Url::parse(&base).map_err(|source| BackendSetupError::InvalidUrl {
        url: api_url.to_string(),
        source,
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(BackendSetupError::UnsupportedScheme(base.scheme().to_string()));
    }
    base.join(EXPENSES_PATH)
        .map_err(|source| BackendSetupError::InvalidUrl {
            url: api_url.to_string(),
            source,
        })
}

#[async_trait]
impl ExpenseBackend for HttpExpenseBackend {
    async fn list_page(
        &self,
        query: ListExpensesQuery,
    ) -> Result<PaginatedExpensesResponse, BackendError> {
        let operation = BackendOperation::ListPage;
        debug!(
            "backend: GET {} page={} limit={}",
            self.expenses_url, query.page, query.limit
        );
        let request = self.http.get(self.expenses_url.clone()).query(&query);
        let response = self.send(operation, request).await?;
        Self::decode(operation, response).await
    }

    async fn list_all(&self) -> Result<Vec<Expense>, BackendError> {
        let operation = BackendOperation::ListAll;
        debug!("backend: GET {}", self.expenses_url);
        let request = self.http.get(self.expenses_url.clone());
        let response = self.send(operation, request).await?;
        Self::decode(operation, response).await
    }

    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<(), BackendError> {
        let operation = BackendOperation::Create;
        debug!("backend: POST {} amount={}", self.expenses_url, request.amount);
        let builder = self.http.post(self.expenses_url.clone()).json(request);
        self.send(operation, builder).await?;
        Ok(())
    }

    async fn delete_expense(&self, id: ExpenseId) -> Result<(), BackendError> {
        let operation = BackendOperation::Delete(id);
        let url = self.expense_url(id);
        debug!("backend: DELETE {url}");
        self.send(operation, self.http.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
