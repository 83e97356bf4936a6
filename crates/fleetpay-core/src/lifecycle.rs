//! Period state machine: `open → processing → closed`, with an orthogonal
//! `locked` bit that only a closed period may carry.
//!
//! Closing re-validates every precondition inside the same transaction as
//! the status write. A close decision taken from a stale read could race a
//! concurrent element assignment; re-checking next to the write closes that
//! window.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{PayrollError, Result};
use crate::period::Period;
use crate::store::{self, PayrollStore};
use crate::types::{CloseBlockReason, DiagnosticStatus, PeriodStatus};

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Move a period to `processing`. Called when the first payroll calculation
/// for any driver in the period starts; idempotent while the period stays
/// open or processing.
pub fn mark_processing(store: &mut PayrollStore, period_id: Uuid) -> Result<Period> {
    let tx = store.transaction()?;
    let period = store::period_row(&tx, period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period_id));
    }
    match period.status {
        PeriodStatus::Closed => Err(PayrollError::AlreadyClosed(period_id)),
        PeriodStatus::Processing => Ok(period),
        PeriodStatus::Open => {
            store::set_period_status(&tx, period_id, PeriodStatus::Processing)?;
            tx.commit()?;
            store.period(period_id)
        }
    }
}

// ---------------------------------------------------------------------------
// Closing
// ---------------------------------------------------------------------------

/// Close a period. All preconditions hold or the first failing one is
/// reported, in this order: pending drivers, failed payments, empty period.
/// Authorization is the caller's concern.
pub fn close_period(store: &mut PayrollStore, period_id: Uuid) -> Result<Period> {
    let tx = store.transaction()?;
    let period = store::period_row(&tx, period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period_id));
    }
    if period.status == PeriodStatus::Closed {
        return Err(PayrollError::AlreadyClosed(period_id));
    }
    if let Some(reason) = close_block_reason(&tx, period_id)? {
        return Err(PayrollError::CloseBlocked(reason));
    }
    store::set_period_status(&tx, period_id, PeriodStatus::Closed)?;
    tx.commit()?;
    store.period(period_id)
}

/// Advisory read-only variant of the close preconditions, for UIs that want
/// to show why the close button is disabled. The answer can be stale by the
/// time a close runs; [`close_period`] re-checks transactionally.
pub fn can_close(store: &PayrollStore, period_id: Uuid) -> Result<Option<CloseBlockReason>> {
    let conn = store.conn();
    let period = store::period_row(conn, period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period_id));
    }
    if period.status == PeriodStatus::Closed {
        return Err(PayrollError::AlreadyClosed(period_id));
    }
    close_block_reason(conn, period_id)
}

pub(crate) fn close_block_reason(
    conn: &rusqlite::Connection,
    period_id: Uuid,
) -> Result<Option<CloseBlockReason>> {
    if store::pending_driver_count(conn, period_id)? > 0 {
        return Ok(Some(CloseBlockReason::PendingDrivers));
    }
    if store::failed_settlement_count_period(conn, period_id)? > 0 {
        return Ok(Some(CloseBlockReason::FailedPayments));
    }
    if store::settlement_count_period(conn, period_id)? == 0 {
        return Ok(Some(CloseBlockReason::EmptyPeriod));
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Locking
// ---------------------------------------------------------------------------

/// Set the lock bit. Only closed periods can be locked; a locked period
/// refuses every further mutation until unlocked.
pub fn lock_period(store: &mut PayrollStore, period_id: Uuid) -> Result<Period> {
    let tx = store.transaction()?;
    let period = store::period_row(&tx, period_id)?;
    if period.status != PeriodStatus::Closed {
        return Err(PayrollError::Validation(format!(
            "only closed periods can be locked; period {period_id} is {}",
            period.status
        )));
    }
    store::set_period_locked(&tx, period_id, true)?;
    tx.commit()?;
    store.period(period_id)
}

pub fn unlock_period(store: &mut PayrollStore, period_id: Uuid) -> Result<Period> {
    let tx = store.transaction()?;
    store::period_row(&tx, period_id)?;
    store::set_period_locked(&tx, period_id, false)?;
    tx.commit()?;
    store.period(period_id)
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Health snapshot of a company's payroll data, mirroring what the back
/// office surfaces on its diagnostic widget.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub company_id: Uuid,
    pub open_periods: i64,
    pub unassigned_elements: i64,
    pub failed_settlements: i64,
    pub orphaned_settlements: i64,
    pub status: DiagnosticStatus,
}

pub fn diagnose(store: &PayrollStore, company_id: Uuid) -> Result<DiagnosticReport> {
    // surface CompanyNotFound before reporting zeros for a typo'd id
    store.company(company_id)?;
    let unassigned_elements = store.unassigned_element_count(company_id)?;
    let failed_settlements = store.failed_settlement_count(company_id)?;
    let orphaned_settlements = store.orphaned_settlement_count(company_id)?;
    let open_periods = store.open_period_count(company_id)?;

    let status = if unassigned_elements > 0 || failed_settlements > 0 || orphaned_settlements > 0 {
        DiagnosticStatus::NeedsAttention
    } else {
        DiagnosticStatus::Normal
    };

    Ok(DiagnosticReport {
        company_id,
        open_periods,
        unassigned_elements,
        failed_settlements,
        orphaned_settlements,
        status,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
