use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    domain::{page_count, Expense, ExpenseId, PaginationMode},
    protocol::ListExpensesQuery,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    backend::ExpenseBackend,
    error::{BackendError, FormError},
    form::ExpenseForm,
    view::{
        filter_expenses, page_total, slice_page, sort_newest_first, DateDisplay,
        PaginationControls,
    },
};

pub const DEFAULT_ITEMS_PER_PAGE: u32 = 5;
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub items_per_page: u32,
    pub pagination_mode: PaginationMode,
    pub date_display: DateDisplay,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            pagination_mode: PaginationMode::Server,
            date_display: DateDisplay::default(),
        }
    }
}

/// What happened to a user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Input failed validation; the backend was not contacted.
    Rejected,
    /// The backend call failed and a notice was raised.
    Failed,
    /// The user declined the confirmation prompt.
    Declined,
    /// Nothing to do: control disabled or value unchanged.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Validation,
    Backend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    LoadExpenses,
    AddExpense,
    DeleteExpense,
    Pagination,
}

/// A message the front end must show and have acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    kind: NoticeKind,
    context: NoticeContext,
    message: String,
}

impl UserNotice {
    fn backend(context: NoticeContext, err: &BackendError) -> Self {
        let action = match context {
            NoticeContext::LoadExpenses | NoticeContext::Pagination => "load the expenses",
            NoticeContext::AddExpense => "add the expense",
            NoticeContext::DeleteExpense => "delete the expense",
        };
        Self {
            kind: NoticeKind::Backend,
            context,
            message: format!("Could not {action}; check the backend and retry. ({err})"),
        }
    }

    fn validation(context: NoticeContext, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Validation,
            context,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn context(&self) -> NoticeContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Something a front end renders changed; take a new snapshot.
    StateChanged,
    Notice(UserNotice),
}

#[async_trait]
pub trait DeleteConfirmation: Send + Sync {
    async fn confirm_delete(&self, id: ExpenseId) -> bool;
}

pub struct AlwaysConfirm;

#[async_trait]
impl DeleteConfirmation for AlwaysConfirm {
    async fn confirm_delete(&self, _id: ExpenseId) -> bool {
        true
    }
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ExpenseListSnapshot {
    pub records: Vec<Expense>,
    pub filtered: Vec<Expense>,
    pub page_total: Decimal,
    pub total: u64,
    pub current_page: u32,
    pub last_page: u32,
    pub items_per_page: u32,
    pub filter: String,
    pub loading: bool,
    pub form: ExpenseForm,
    pub controls: PaginationControls,
}

#[derive(Debug)]
struct ListState {
    records: Vec<Expense>,
    total: u64,
    last_page: u32,
    current_page: u32,
    items_per_page: u32,
    filter: String,
    loading: bool,
    form: ExpenseForm,
}

impl ListState {
    fn begin_load(&mut self) -> ListExpensesQuery {
        self.loading = true;
        ListExpensesQuery {
            page: self.current_page,
            limit: self.items_per_page,
        }
    }
}

struct LoadedPage {
    records: Vec<Expense>,
    total: u64,
    last_page: u32,
}

pub struct ExpenseListController {
    backend: Arc<dyn ExpenseBackend>,
    confirmation: Arc<dyn DeleteConfirmation>,
    mode: PaginationMode,
    dates: DateDisplay,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ExpenseListController {
    pub fn new(
        backend: Arc<dyn ExpenseBackend>,
        confirmation: Arc<dyn DeleteConfirmation>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            backend,
            confirmation,
            mode: options.pagination_mode,
            dates: options.date_display,
            inner: Mutex::new(ListState {
                records: Vec::new(),
                total: 0,
                last_page: 1,
                current_page: 1,
                items_per_page: options.items_per_page.max(1),
                filter: String::new(),
                // Nothing is on screen until the first refresh lands.
                loading: true,
                form: ExpenseForm::default(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn date_display(&self) -> &DateDisplay {
        &self.dates
    }

    pub fn pagination_mode(&self) -> PaginationMode {
        self.mode
    }

    pub async fn snapshot(&self) -> ExpenseListSnapshot {
        let state = self.inner.lock().await;
        let filtered: Vec<Expense> = filter_expenses(&state.records, &state.filter, &self.dates)
            .into_iter()
            .cloned()
            .collect();
        ExpenseListSnapshot {
            page_total: page_total(&filtered),
            filtered,
            records: state.records.clone(),
            total: state.total,
            current_page: state.current_page,
            last_page: state.last_page,
            items_per_page: state.items_per_page,
            filter: state.filter.clone(),
            loading: state.loading,
            form: state.form.clone(),
            controls: PaginationControls::new(state.current_page, state.last_page, state.loading),
        }
    }

    /// Re-fetch the current page.
    pub async fn refresh(&self) -> ActionOutcome {
        let query = self.inner.lock().await.begin_load();
        self.load(query).await
    }

    async fn load(&self, query: ListExpensesQuery) -> ActionOutcome {
        self.emit(ControllerEvent::StateChanged);
        let result = self.fetch(query).await;

        let outcome = {
            let mut state = self.inner.lock().await;
            state.loading = false;
            match result {
                Ok(loaded) => {
                    info!(
                        "expenses: loaded page={} limit={} records={} total={} last_page={}",
                        query.page,
                        query.limit,
                        loaded.records.len(),
                        loaded.total,
                        loaded.last_page
                    );
                    state.records = loaded.records;
                    state.total = loaded.total;
                    state.last_page = loaded.last_page;
                    Ok(())
                }
                Err(err) => Err(err),
            }
        };

        self.emit(ControllerEvent::StateChanged);
        match outcome {
            Ok(()) => ActionOutcome::Applied,
            Err(err) => {
                error!(
                    "expenses: load failed page={} limit={}: {err}",
                    query.page, query.limit
                );
                self.notify(UserNotice::backend(NoticeContext::LoadExpenses, &err));
                ActionOutcome::Failed
            }
        }
    }

    async fn fetch(&self, query: ListExpensesQuery) -> Result<LoadedPage, BackendError> {
        match self.mode {
            PaginationMode::Server => {
                let body = self.backend.list_page(query).await?;
                let mut records = body.data;
                sort_newest_first(&mut records);
                Ok(LoadedPage {
                    records,
                    total: body.total,
                    last_page: body.last_page,
                })
            }
            PaginationMode::Client => {
                let mut all = self.backend.list_all().await?;
                sort_newest_first(&mut all);
                let total = all.len() as u64;
                Ok(LoadedPage {
                    records: slice_page(&all, query.page, query.limit),
                    total,
                    last_page: page_count(total, query.limit),
                })
            }
        }
    }

    /// Moves to `page` and re-fetches. Mirrors a reactive dependency: an
    /// unchanged page triggers nothing.
    async fn change_page(&self, page: u32) -> ActionOutcome {
        let query = {
            let mut state = self.inner.lock().await;
            if state.current_page == page {
                return ActionOutcome::Ignored;
            }
            debug!("expenses: page {} -> {}", state.current_page, page);
            state.current_page = page;
            state.begin_load()
        };
        self.load(query).await
    }

    pub async fn go_to_page(&self, page: u32) -> ActionOutcome {
        let target = {
            let state = self.inner.lock().await;
            if state.loading {
                return ActionOutcome::Ignored;
            }
            page.clamp(1, state.last_page.max(1))
        };
        self.change_page(target).await
    }

    pub async fn previous_page(&self) -> ActionOutcome {
        let target = {
            let state = self.inner.lock().await;
            if state.loading || state.current_page <= 1 {
                return ActionOutcome::Ignored;
            }
            state.current_page - 1
        };
        self.change_page(target).await
    }

    pub async fn next_page(&self) -> ActionOutcome {
        let target = {
            let state = self.inner.lock().await;
            if state.loading || state.current_page >= state.last_page {
                return ActionOutcome::Ignored;
            }
            state.current_page + 1
        };
        self.change_page(target).await
    }

    /// Changes the page size and starts over from the first page.
    pub async fn set_items_per_page(&self, items_per_page: u32) -> ActionOutcome {
        if items_per_page == 0 {
            self.notify(UserNotice::validation(
                NoticeContext::Pagination,
                "Items per page must be at least 1.",
            ));
            return ActionOutcome::Rejected;
        }
        let query = {
            let mut state = self.inner.lock().await;
            if state.loading || state.items_per_page == items_per_page {
                return ActionOutcome::Ignored;
            }
            state.items_per_page = items_per_page;
            state.current_page = 1;
            state.begin_load()
        };
        self.load(query).await
    }

    pub async fn set_filter(&self, text: impl Into<String>) {
        self.inner.lock().await.filter = text.into();
        self.emit(ControllerEvent::StateChanged);
    }

    pub async fn clear_filter(&self) {
        self.set_filter(String::new()).await;
    }

    pub async fn set_form_amount(&self, amount: impl Into<String>) {
        self.inner.lock().await.form.amount = amount.into();
        self.emit(ControllerEvent::StateChanged);
    }

    pub async fn set_form_description(&self, description: impl Into<String>) {
        self.inner.lock().await.form.description = description.into();
        self.emit(ControllerEvent::StateChanged);
    }

    /// Submits the expense form. The new record's page is up to the backend,
    /// so the current page is simply re-fetched afterwards.
    pub async fn add_expense(&self) -> ActionOutcome {
        let validated = self.inner.lock().await.form.validate();
        let request = match validated {
            Ok(request) => request,
            Err(err) => {
                warn!("expenses: rejected new expense: {err}");
                self.notify(UserNotice::validation(
                    NoticeContext::AddExpense,
                    form_error_message(&err),
                ));
                return ActionOutcome::Rejected;
            }
        };

        if let Err(err) = self.backend.create_expense(&request).await {
            error!("expenses: {err}");
            self.notify(UserNotice::backend(NoticeContext::AddExpense, &err));
            return ActionOutcome::Failed;
        }

        info!(
            "expenses: created amount={} description={:?}",
            request.amount, request.description
        );
        self.inner.lock().await.form.clear();
        self.refresh().await;
        ActionOutcome::Applied
    }

    /// Deletes `id` after confirmation.
    ///
    /// When the record was the only one visible on a page past the first,
    /// the controller steps back a page instead of re-fetching one that is
    /// now empty. Only records in the filtered view can be deleted.
    pub async fn delete_expense(&self, id: ExpenseId) -> ActionOutcome {
        let shown = {
            let state = self.inner.lock().await;
            filter_expenses(&state.records, &state.filter, &self.dates)
                .iter()
                .any(|expense| expense.id == id)
        };
        if !shown {
            warn!("expenses: delete of {id} ignored, not in the current view");
            self.notify(UserNotice::validation(
                NoticeContext::DeleteExpense,
                format!("Expense #{id} is not shown on this page."),
            ));
            return ActionOutcome::Ignored;
        }

        if !self.confirmation.confirm_delete(id).await {
            debug!("expenses: delete of {id} declined");
            return ActionOutcome::Declined;
        }

        let (visible, current_page) = {
            let state = self.inner.lock().await;
            let visible = filter_expenses(&state.records, &state.filter, &self.dates).len();
            (visible, state.current_page)
        };

        if let Err(err) = self.backend.delete_expense(id).await {
            error!("expenses: {err}");
            self.notify(UserNotice::backend(NoticeContext::DeleteExpense, &err));
            return ActionOutcome::Failed;
        }

        info!("expenses: deleted id={id}");
        if visible == 1 && current_page > 1 {
            self.change_page(current_page - 1).await;
        } else {
            self.refresh().await;
        }
        ActionOutcome::Applied
    }

    fn notify(&self, notice: UserNotice) {
        let _ = self.events.send(ControllerEvent::Notice(notice));
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

fn form_error_message(err: &FormError) -> String {
    match err {
        FormError::MissingAmount | FormError::EmptyDescription => {
            "Please enter an amount and a description.".to_string()
        }
        other => format!("Please fix the expense form: {other}."),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
