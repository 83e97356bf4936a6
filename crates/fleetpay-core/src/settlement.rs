use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, Result};
use crate::lifecycle;
use crate::store::PayrollStore;
use crate::types::{PaymentStatus, PeriodStatus};

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Aggregate payroll record for one (period, driver) pair. The monetary
/// amounts are produced by the external calculator; this engine only tracks
/// their payment lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub period_id: Uuid,
    pub driver_id: Uuid,
    pub payment_status: PaymentStatus,
    pub net_amount_cents: i64,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SettlementCalculator
// ---------------------------------------------------------------------------

/// Seam to the external payroll math. Implementations are opaque pass/fail;
/// the engine never inspects the numbers they produce.
pub trait SettlementCalculator {
    /// Seed initial aggregates for a freshly materialized period.
    fn seed_period(&self, company_id: Uuid, period_id: Uuid) -> Result<()>;

    /// Recompute the aggregate record for one driver in one period.
    fn recalculate(&self, period_id: Uuid, driver_id: Uuid) -> Result<()>;
}

/// Default calculator used where no payroll backend is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCalculator;

impl SettlementCalculator for NoopCalculator {
    fn seed_period(&self, _company_id: Uuid, _period_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn recalculate(&self, _period_id: Uuid, _driver_id: Uuid) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Calculation results
// ---------------------------------------------------------------------------

/// Record the outcome of a payroll calculation for one driver. Upserts the
/// settlement as `calculated` and flips the period to `processing` — starting
/// a calculation is what moves a period out of `open`.
pub fn record_calculation(
    store: &mut PayrollStore,
    period_id: Uuid,
    driver_id: Uuid,
    net_amount_cents: i64,
) -> Result<Settlement> {
    let period = store.period(period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period.id));
    }
    if period.status == PeriodStatus::Closed {
        return Err(PayrollError::AlreadyClosed(period.id));
    }
    let settlement = store.upsert_calculation(period_id, driver_id, net_amount_cents)?;
    lifecycle::mark_processing(store, period_id)?;
    Ok(settlement)
}

/// Record a calculator failure for one driver so the close preconditions can
/// surface it. Paid settlements are final and cannot be failed.
pub fn record_failure(store: &mut PayrollStore, settlement_id: Uuid) -> Result<Settlement> {
    let settlement = store.settlement(settlement_id)?;
    let period = store.period(settlement.period_id)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period.id));
    }
    if settlement.payment_status == PaymentStatus::Paid {
        return Err(PayrollError::PaymentNotAllowed {
            settlement: settlement.id,
            status: settlement.payment_status,
        });
    }
    store.set_settlement_status(settlement_id, PaymentStatus::Failed)?;
    store.settlement(settlement_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{seed_company, sample_bounds};
    use crate::types::{PayFrequency, PeriodKind};

    #[test]
    fn record_calculation_marks_period_processing() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(company.id, sample_bounds(), PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
        assert_eq!(period.status, PeriodStatus::Open);

        let driver = Uuid::new_v4();
        let settlement = record_calculation(&mut store, period.id, driver, 98_500).unwrap();
        assert_eq!(settlement.payment_status, PaymentStatus::Calculated);
        assert_eq!(settlement.net_amount_cents, 98_500);

        let period = store.period(period.id).unwrap();
        assert_eq!(period.status, PeriodStatus::Processing);
    }

    #[test]
    fn recalculation_overwrites_amount_for_same_driver() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(company.id, sample_bounds(), PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
        let driver = Uuid::new_v4();

        let first = record_calculation(&mut store, period.id, driver, 10_000).unwrap();
        let second = record_calculation(&mut store, period.id, driver, 12_500).unwrap();
        assert_eq!(first.id, second.id, "upsert must keep one row per driver");
        assert_eq!(second.net_amount_cents, 12_500);
        assert_eq!(store.list_settlements(period.id).unwrap().len(), 1);
    }

    #[test]
    fn record_failure_rejects_paid_settlement() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(company.id, sample_bounds(), PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
        let driver = Uuid::new_v4();
        let settlement = record_calculation(&mut store, period.id, driver, 10_000).unwrap();
        store
            .set_settlement_status(settlement.id, PaymentStatus::Paid)
            .unwrap();

        let err = record_failure(&mut store, settlement.id).unwrap_err();
        assert!(matches!(err, PayrollError::PaymentNotAllowed { .. }));
    }
}
