use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{CloseBlockReason, PaymentStatus};

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error("pay period not found: {0}")]
    PeriodNotFound(Uuid),

    #[error("financial element not found: {0}")]
    ElementNotFound(Uuid),

    #[error("settlement not found: {0}")]
    SettlementNotFound(Uuid),

    #[error("pay period {0} is locked")]
    LockedPeriod(Uuid),

    #[error("pay period {0} is already closed")]
    AlreadyClosed(Uuid),

    #[error("cannot close period: {0}")]
    CloseBlocked(CloseBlockReason),

    #[error("settlement {settlement} cannot be paid from status '{status}'")]
    PaymentNotAllowed {
        settlement: Uuid,
        status: PaymentStatus,
    },

    /// Period interval collision for a company. Raised by the storage layer's
    /// uniqueness/overlap check; `ensure_period` recovers from it internally
    /// and never surfaces it to callers.
    #[error("period starting {start} collides with an existing period for company {company}")]
    DuplicatePeriod { company: Uuid, start: NaiveDate },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("payroll calculator failed: {0}")]
    Calculator(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, PayrollError>;
