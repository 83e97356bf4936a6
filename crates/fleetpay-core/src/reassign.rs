//! Atomic element reassignment between periods.
//!
//! Either the element's period id changes and both affected periods are
//! flagged for payroll recalculation, or nothing changes at all. Everything
//! runs in one transaction; the first guard failure rolls it back.

use uuid::Uuid;

use crate::element::FinancialElement;
use crate::error::{PayrollError, Result};
use crate::store::{self, PayrollStore};

/// Move an element to `new_period_id`.
///
/// Fails with [`PayrollError::LockedPeriod`] if the source or destination is
/// locked, and refuses cross-company moves. A closed-but-unlocked period is a
/// valid source and destination — closing without locking deliberately leaves
/// a correction window.
pub fn reassign(
    store: &mut PayrollStore,
    element_id: Uuid,
    new_period_id: Uuid,
) -> Result<FinancialElement> {
    let tx = store.transaction()?;
    let element = store::element_row(&tx, element_id)?;
    let destination = store::period_row(&tx, new_period_id)?;

    if destination.company_id != element.company_id {
        return Err(PayrollError::Validation(format!(
            "period {new_period_id} belongs to a different company than element {element_id}"
        )));
    }
    if destination.locked {
        return Err(PayrollError::LockedPeriod(destination.id));
    }
    if let Some(source_id) = element.period_id {
        if source_id == new_period_id {
            return Err(PayrollError::Validation(format!(
                "element {element_id} is already assigned to period {new_period_id}"
            )));
        }
        let source = store::period_row(&tx, source_id)?;
        if source.locked {
            return Err(PayrollError::LockedPeriod(source.id));
        }
        store::set_period_recalc_pending(&tx, source.id, true)?;
    }

    store::set_element_period(&tx, element_id, new_period_id)?;
    store::set_period_recalc_pending(&tx, destination.id, true)?;
    tx.commit()?;

    store.element(element_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
