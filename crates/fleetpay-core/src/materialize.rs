//! Lazy, idempotent period materialization.
//!
//! Periods are created on first reference to a date they cover — never
//! eagerly, never as a backfilled history. The only race in the engine lives
//! here: two request handlers referencing the same uncovered date both
//! compute identical boundaries and both try to insert. No lock is taken;
//! the storage layer's uniqueness constraint picks the winner and the loser
//! re-reads the row. Callers never see the conflict.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::calendar;
use crate::error::{PayrollError, Result};
use crate::period::{Period, PeriodPosition, PeriodView, PreviewPeriod};
use crate::settlement::SettlementCalculator;
use crate::store::{PayrollStore, PeriodFilter};
use crate::types::PeriodKind;

/// Return the persisted period covering `target_date`, creating it first if
/// no period covers that date yet.
///
/// On a fresh insert the external calculator seeds initial aggregates; that
/// call is best-effort — a calculator outage must not block materialization.
pub fn ensure_period(
    store: &mut PayrollStore,
    calculator: &dyn SettlementCalculator,
    company_id: Uuid,
    target_date: NaiveDate,
) -> Result<Period> {
    if let Some(existing) = store.find_period_containing(company_id, target_date)? {
        return Ok(existing);
    }

    let company = store.company(company_id)?;
    let bounds = calendar::current_period(
        target_date,
        company.config.frequency,
        &company.config.anchor(),
    );

    match store.insert_period(
        company_id,
        bounds,
        company.config.frequency,
        PeriodKind::Regular,
    ) {
        Ok(period) => {
            if let Err(e) = calculator.seed_period(company_id, period.id) {
                tracing::warn!(
                    period = %period.id,
                    error = %e,
                    "initial payroll seeding failed; period stays materialized"
                );
            }
            Ok(period)
        }
        Err(PayrollError::DuplicatePeriod { .. }) => {
            // A concurrent caller won the insert; hand back its row.
            store
                .find_period_containing(company_id, target_date)?
                .ok_or_else(|| {
                    // The collision came from an interval that overlaps the
                    // computed bounds without covering the target date — a
                    // custom period cutting across the cadence grid.
                    PayrollError::Validation(format!(
                        "computed period [{}, {}] collides with an existing period \
                         that does not cover {target_date}",
                        bounds.start, bounds.end
                    ))
                })
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Lookahead previews
// ---------------------------------------------------------------------------

/// Previous/current/next periods for picker UIs, computed from config alone.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodLookahead {
    pub previous: PreviewPeriod,
    pub current: PreviewPeriod,
    pub next: PreviewPeriod,
}

/// Compute the three surrounding periods without materializing anything.
/// The result carries [`PreviewPeriod`]s only — nothing here can be mutated
/// or mistaken for a persisted row.
pub fn lookahead(store: &PayrollStore, company_id: Uuid, today: NaiveDate) -> Result<PeriodLookahead> {
    let company = store.company(company_id)?;
    let frequency = company.config.frequency;
    let anchor = company.config.anchor();

    let preview = |bounds, position| PreviewPeriod {
        company_id,
        bounds,
        frequency,
        position,
    };

    Ok(PeriodLookahead {
        previous: preview(
            calendar::previous_period(today, frequency, &anchor),
            PeriodPosition::Previous,
        ),
        current: preview(
            calendar::current_period(today, frequency, &anchor),
            PeriodPosition::Current,
        ),
        next: preview(
            calendar::next_period(today, frequency, &anchor),
            PeriodPosition::Next,
        ),
    })
}

/// The period-picker feed: every persisted period, plus previews for the
/// surrounding slots that have not been materialized yet. Previews stay
/// previews — selecting one goes through [`ensure_period`].
pub fn browse_periods(
    store: &PayrollStore,
    company_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<PeriodView>> {
    let persisted = store.list_periods(company_id, &PeriodFilter::default())?;
    let ahead = lookahead(store, company_id, today)?;

    let mut views: Vec<PeriodView> = persisted
        .iter()
        .cloned()
        .map(PeriodView::Persisted)
        .collect();
    for preview in [ahead.previous, ahead.current, ahead.next] {
        if !persisted
            .iter()
            .any(|p| p.start_date == preview.bounds.start)
        {
            views.push(PeriodView::Preview(preview));
        }
    }
    views.sort_by_key(|v| match v {
        PeriodView::Persisted(p) => p.start_date,
        PeriodView::Preview(p) => p.bounds.start,
    });
    Ok(views)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
