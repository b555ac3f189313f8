//! Client-side state for browsing an expense backend: one page of records,
//! a free-text filter over it, derived totals, and navigation.

pub mod backend;
pub mod controller;
pub mod error;
pub mod form;
pub mod view;

pub use backend::{ExpenseBackend, HttpExpenseBackend};
pub use controller::{
    ActionOutcome, AlwaysConfirm, ControllerEvent, ControllerOptions, DeleteConfirmation,
    ExpenseListController, ExpenseListSnapshot, NoticeContext, NoticeKind, UserNotice,
    DEFAULT_ITEMS_PER_PAGE,
};
pub use error::{BackendError, BackendOperation, BackendSetupError, FormError};
pub use form::ExpenseForm;
pub use view::{format_money, DateDisplay, PaginationControls};
