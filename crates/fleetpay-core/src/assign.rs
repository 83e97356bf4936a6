//! Period assignment for new financial elements.
//!
//! The period id is resolved once, when the element is created, and stored on
//! the row (eager denormalization — reads never recompute it). Editing an
//! element's dates afterwards does NOT re-resolve its period; that is a
//! documented invariant, and moving an element is exclusively the
//! reassignment service's job.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::element::{FinancialElement, NewElement};
use crate::error::{PayrollError, Result};
use crate::materialize;
use crate::settlement::SettlementCalculator;
use crate::store::PayrollStore;

/// Resolve the owning period for `new` and persist the element with that
/// period id. The relevant date follows the company's assignment criterion,
/// falling back to `today` when the element carries no date yet.
pub fn resolve_and_create(
    store: &mut PayrollStore,
    calculator: &dyn SettlementCalculator,
    new: NewElement,
    today: NaiveDate,
) -> Result<FinancialElement> {
    let company = store.company(new.company_id)?;
    let relevant = new
        .relevant_date(company.config.assignment_criterion)
        .unwrap_or(today);

    let period = materialize::ensure_period(store, calculator, new.company_id, relevant)?;
    if period.locked {
        return Err(PayrollError::LockedPeriod(period.id));
    }
    store.insert_element(&new, period.id)
}

/// The period id an element with this date would land in, without creating
/// the element. Materializes the period, so the id is real and stable.
pub fn resolve_period_id(
    store: &mut PayrollStore,
    calculator: &dyn SettlementCalculator,
    company_id: Uuid,
    relevant_date: NaiveDate,
) -> Result<Uuid> {
    Ok(materialize::ensure_period(store, calculator, company_id, relevant_date)?.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::NoopCalculator;
    use crate::store::test_support::{seed_company, weekly_config};
    use crate::types::{AssignmentCriterion, ElementKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load(company_id: Uuid) -> NewElement {
        NewElement {
            company_id,
            driver_id: Uuid::new_v4(),
            kind: ElementKind::Load,
            amount_cents: 180_000,
            pickup_date: Some(date(2024, 6, 12)),
            delivery_date: Some(date(2024, 6, 19)),
            event_date: None,
        }
    }

    #[test]
    fn assigns_by_pickup_date() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store); // criterion: pickup_date

        let element =
            resolve_and_create(&mut store, &NoopCalculator, load(company.id), date(2024, 6, 1))
                .unwrap();
        let period = store.period(element.period_id.unwrap()).unwrap();
        assert!(period.contains(date(2024, 6, 12)));
        assert_eq!(period.start_date, date(2024, 6, 10));
    }

    #[test]
    fn assigns_by_delivery_date_when_configured() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let mut config = weekly_config();
        config.assignment_criterion = AssignmentCriterion::DeliveryDate;
        let company = store.create_company("Blue Haul", config).unwrap();

        let element =
            resolve_and_create(&mut store, &NoopCalculator, load(company.id), date(2024, 6, 1))
                .unwrap();
        let period = store.period(element.period_id.unwrap()).unwrap();
        // delivery 2024-06-19 → week of 2024-06-17
        assert_eq!(period.start_date, date(2024, 6, 17));
    }

    #[test]
    fn missing_date_falls_back_to_today() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);

        let mut new = load(company.id);
        new.kind = ElementKind::Deduction;
        new.pickup_date = None;
        new.delivery_date = None;
        new.event_date = None;

        let today = date(2024, 7, 3);
        let element = resolve_and_create(&mut store, &NoopCalculator, new, today).unwrap();
        let period = store.period(element.period_id.unwrap()).unwrap();
        assert!(period.contains(today));
    }

    #[test]
    fn assignment_into_locked_period_fails_and_changes_nothing() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);

        // Materialize, close out-of-band, then lock.
        let period =
            materialize::ensure_period(&mut store, &NoopCalculator, company.id, date(2024, 6, 12))
                .unwrap();
        let driver = Uuid::new_v4();
        let new = NewElement {
            driver_id: driver,
            ..load(company.id)
        };
        // close the period properly: element + paid settlement
        let placed = resolve_and_create(&mut store, &NoopCalculator, new, date(2024, 6, 1)).unwrap();
        assert_eq!(placed.period_id, Some(period.id));
        crate::settlement::record_calculation(&mut store, period.id, driver, 50_000).unwrap();
        let settlement_id = store.list_settlements(period.id).unwrap()[0].id;
        crate::payout::mark_many_paid(
            &mut store,
            &crate::payout::PayoutRequest {
                settlement_ids: vec![settlement_id],
                method: "ach".into(),
                reference: None,
                notes: None,
            },
        )
        .unwrap();
        crate::lifecycle::lock_period(&mut store, period.id).unwrap();

        let err =
            resolve_and_create(&mut store, &NoopCalculator, load(company.id), date(2024, 6, 1))
                .unwrap_err();
        assert!(matches!(err, PayrollError::LockedPeriod(_)));
        // still just the one element from before
        assert_eq!(store.list_elements(period.id).unwrap().len(), 1);
    }
}
