use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, PeriodBounds};
use crate::types::{PayFrequency, PeriodKind, PeriodStatus};

// ---------------------------------------------------------------------------
// Period (persisted)
// ---------------------------------------------------------------------------

/// A materialized pay period row. Only the materializer creates these; only
/// the lifecycle controller (and, through it, the payout orchestrator)
/// mutates `status`/`locked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: Uuid,
    pub company_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: PayFrequency,
    pub kind: PeriodKind,
    pub status: PeriodStatus,
    pub locked: bool,
    pub recalc_pending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds().contains(date)
    }

    pub fn bounds(&self) -> PeriodBounds {
        PeriodBounds {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn label(&self) -> String {
        calendar::period_label(&self.bounds())
    }
}

// ---------------------------------------------------------------------------
// PreviewPeriod (never persisted)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPosition {
    Previous,
    Current,
    Next,
}

/// Computed lookahead shown in period pickers before a real period exists.
/// Deliberately a separate type from [`Period`]: it has no id and no status,
/// so it cannot be mutated, closed, or handed to anything expecting a
/// persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPeriod {
    pub company_id: Uuid,
    pub bounds: PeriodBounds,
    pub frequency: PayFrequency,
    pub position: PeriodPosition,
}

impl PreviewPeriod {
    pub fn label(&self) -> String {
        calendar::period_label(&self.bounds)
    }
}

/// A period as seen by browsing callers: either a persisted row or a
/// computed preview. Tagged so the two can never be confused downstream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PeriodView {
    Persisted(Period),
    Preview(PreviewPeriod),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_period() -> Period {
        Period {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            start_date: date(2024, 6, 10),
            end_date: date(2024, 6, 16),
            frequency: PayFrequency::Weekly,
            kind: PeriodKind::Regular,
            status: PeriodStatus::Open,
            locked: false,
            recalc_pending: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn contains_is_inclusive() {
        let p = sample_period();
        assert!(p.contains(date(2024, 6, 10)));
        assert!(p.contains(date(2024, 6, 16)));
        assert!(!p.contains(date(2024, 6, 9)));
        assert!(!p.contains(date(2024, 6, 17)));
    }

    #[test]
    fn view_is_tagged() {
        let p = sample_period();
        let json = serde_json::to_string(&PeriodView::Persisted(p.clone())).unwrap();
        assert!(json.contains("\"source\":\"persisted\""));

        let preview = PreviewPeriod {
            company_id: p.company_id,
            bounds: p.bounds(),
            frequency: p.frequency,
            position: PeriodPosition::Next,
        };
        let json = serde_json::to_string(&PeriodView::Preview(preview)).unwrap();
        assert!(json.contains("\"source\":\"preview\""));
        assert!(json.contains("\"next\""));
    }

    #[test]
    fn period_label_delegates() {
        assert_eq!(sample_period().label(), "WK24 - 2024");
    }
}
