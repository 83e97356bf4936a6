//! Batch payout: mark settlements paid with per-item failure isolation, then
//! auto-close every touched period whose close preconditions now hold.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{PayrollError, Result};
use crate::lifecycle;
use crate::store::{self, PayrollStore};

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PayoutRequest {
    pub settlement_ids: Vec<Uuid>,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutItemError {
    pub settlement_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutReport {
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<PayoutItemError>,
    pub closed_periods: Vec<Uuid>,
}

// ---------------------------------------------------------------------------
// Batch mark-paid
// ---------------------------------------------------------------------------

/// Mark each settlement paid independently; one bad id never aborts the
/// batch. Afterwards every period touched by a successful payment is
/// re-checked and auto-closed if its close preconditions hold — the report
/// says which ones closed.
pub fn mark_many_paid(store: &mut PayrollStore, request: &PayoutRequest) -> Result<PayoutReport> {
    let mut errors = Vec::new();
    let mut success_count = 0usize;
    let mut touched: Vec<Uuid> = Vec::new();

    for &settlement_id in &request.settlement_ids {
        match mark_one_paid(store, settlement_id, request) {
            Ok(period_id) => {
                success_count += 1;
                if !touched.contains(&period_id) {
                    touched.push(period_id);
                }
            }
            Err(e) => errors.push(PayoutItemError {
                settlement_id,
                message: e.to_string(),
            }),
        }
    }

    let mut closed_periods = Vec::new();
    for period_id in touched {
        match lifecycle::close_period(store, period_id) {
            Ok(_) => closed_periods.push(period_id),
            // other drivers still pending/failed, or an operator already
            // closed or locked the period meanwhile — not this batch's error
            Err(PayrollError::CloseBlocked(_))
            | Err(PayrollError::AlreadyClosed(_))
            | Err(PayrollError::LockedPeriod(_)) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(PayoutReport {
        success_count,
        error_count: errors.len(),
        errors,
        closed_periods,
    })
}

/// Validate and pay a single settlement in its own transaction. Returns the
/// period the settlement belongs to.
fn mark_one_paid(
    store: &mut PayrollStore,
    settlement_id: Uuid,
    request: &PayoutRequest,
) -> Result<Uuid> {
    let tx = store.transaction()?;
    let settlement = store::settlement_row(&tx, settlement_id)?;
    let period = store::period_row(&tx, settlement.period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period.id));
    }
    if !settlement.payment_status.is_payable() {
        return Err(PayrollError::PaymentNotAllowed {
            settlement: settlement.id,
            status: settlement.payment_status,
        });
    }
    store::mark_settlement_paid(
        &tx,
        settlement_id,
        &request.method,
        request.reference.as_deref(),
        request.notes.as_deref(),
    )?;
    tx.commit()?;
    Ok(period.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
