//! End-to-end exercise of the engine across its public surface: elements are
//! created through the assignment resolver (materializing the period), each
//! driver gets a calculation, payouts run in batches, and the period closes
//! itself once the last driver is paid.

use chrono::NaiveDate;
use uuid::Uuid;

use fleetpay_core::assign;
use fleetpay_core::config::PayCycleConfig;
use fleetpay_core::element::NewElement;
use fleetpay_core::lifecycle;
use fleetpay_core::payout::{mark_many_paid, PayoutRequest};
use fleetpay_core::settlement::{record_calculation, NoopCalculator};
use fleetpay_core::store::PayrollStore;
use fleetpay_core::types::{
    AssignmentCriterion, CloseBlockReason, ElementKind, PayFrequency, PeriodStatus,
};
use fleetpay_core::PayrollError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_company(store: &PayrollStore) -> fleetpay_core::config::Company {
    store
        .create_company(
            "Acme Freight",
            PayCycleConfig {
                frequency: PayFrequency::Weekly,
                cycle_start_day: 1,
                cycle_origin: date(2024, 1, 1),
                assignment_criterion: AssignmentCriterion::PickupDate,
            },
        )
        .unwrap()
}

fn load_for(company_id: Uuid, driver_id: Uuid, pickup: NaiveDate) -> NewElement {
    NewElement {
        company_id,
        driver_id,
        kind: ElementKind::Load,
        amount_cents: 145_000,
        pickup_date: Some(pickup),
        delivery_date: Some(pickup + chrono::Duration::days(2)),
        event_date: None,
    }
}

fn pay(store: &mut PayrollStore, ids: Vec<Uuid>) -> fleetpay_core::payout::PayoutReport {
    mark_many_paid(
        store,
        &PayoutRequest {
            settlement_ids: ids,
            method: "ach".into(),
            reference: Some("RUN-17".into()),
            notes: None,
        },
    )
    .unwrap()
}

#[test]
fn three_drivers_pending_then_auto_close() {
    let mut store = PayrollStore::open_in_memory().unwrap();
    let company = weekly_company(&store);
    let drivers = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

    // Creating the first element materializes the week of 2024-06-10.
    let mut period_id = None;
    for &driver in &drivers {
        let element = assign::resolve_and_create(
            &mut store,
            &NoopCalculator,
            load_for(company.id, driver, date(2024, 6, 11)),
            date(2024, 6, 11),
        )
        .unwrap();
        let assigned = element.period_id.expect("element must be assigned");
        match period_id {
            None => period_id = Some(assigned),
            Some(existing) => assert_eq!(existing, assigned, "same week, same period"),
        }
    }
    let period_id = period_id.unwrap();
    let period = store.period(period_id).unwrap();
    assert_eq!(period.start_date, date(2024, 6, 10));
    assert_eq!(period.end_date, date(2024, 6, 16));
    assert_eq!(period.status, PeriodStatus::Open);

    // Calculations flip the period to processing.
    let mut settlement_ids = Vec::new();
    for &driver in &drivers {
        let settlement = record_calculation(&mut store, period_id, driver, 145_000).unwrap();
        settlement_ids.push(settlement.id);
    }
    assert_eq!(
        store.period(period_id).unwrap().status,
        PeriodStatus::Processing
    );

    // Two paid, one pending: close is blocked on the pending driver.
    let report = pay(&mut store, settlement_ids[..2].to_vec());
    assert_eq!(report.success_count, 2);
    assert!(report.closed_periods.is_empty());

    let err = lifecycle::close_period(&mut store, period_id).unwrap_err();
    match err {
        PayrollError::CloseBlocked(reason) => {
            assert_eq!(reason, CloseBlockReason::PendingDrivers);
            assert_eq!(reason.as_str(), "pending_drivers");
        }
        other => panic!("expected CloseBlocked, got {other}"),
    }

    // Paying the third driver auto-closes the period.
    let report = pay(&mut store, vec![settlement_ids[2]]);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.closed_periods, vec![period_id]);
    assert_eq!(store.period(period_id).unwrap().status, PeriodStatus::Closed);
}

#[test]
fn elements_in_different_weeks_materialize_distinct_periods() {
    let mut store = PayrollStore::open_in_memory().unwrap();
    let company = weekly_company(&store);
    let driver = Uuid::new_v4();

    let a = assign::resolve_and_create(
        &mut store,
        &NoopCalculator,
        load_for(company.id, driver, date(2024, 6, 11)),
        date(2024, 6, 11),
    )
    .unwrap();
    let b = assign::resolve_and_create(
        &mut store,
        &NoopCalculator,
        load_for(company.id, driver, date(2024, 6, 18)),
        date(2024, 6, 18),
    )
    .unwrap();

    assert_ne!(a.period_id, b.period_id);
    let periods = store
        .list_periods(company.id, &Default::default())
        .unwrap();
    assert_eq!(periods.len(), 2);
    // contiguous weeks
    assert_eq!(
        periods[0].end_date + chrono::Duration::days(1),
        periods[1].start_date
    );
}

#[test]
fn reassignment_moves_between_materialized_periods() {
    let mut store = PayrollStore::open_in_memory().unwrap();
    let company = weekly_company(&store);
    let driver = Uuid::new_v4();

    let element = assign::resolve_and_create(
        &mut store,
        &NoopCalculator,
        load_for(company.id, driver, date(2024, 6, 11)),
        date(2024, 6, 11),
    )
    .unwrap();
    let source_id = element.period_id.unwrap();

    // Materialize next week by referencing a date in it.
    let next = fleetpay_core::materialize::ensure_period(
        &mut store,
        &NoopCalculator,
        company.id,
        date(2024, 6, 18),
    )
    .unwrap();

    let moved = fleetpay_core::reassign::reassign(&mut store, element.id, next.id).unwrap();
    assert_eq!(moved.period_id, Some(next.id));
    assert!(store.period(source_id).unwrap().recalc_pending);
    assert!(store.period(next.id).unwrap().recalc_pending);
}
