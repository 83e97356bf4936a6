use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AssignmentCriterion, ElementKind};

// ---------------------------------------------------------------------------
// FinancialElement
// ---------------------------------------------------------------------------

/// A payable event for a driver: a load, a fuel expense, a deduction, or
/// other income. `period_id` is resolved once, at creation, by the assignment
/// resolver; editing the dates afterwards never re-resolves it — moving an
/// element is the reassignment service's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialElement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub driver_id: Uuid,
    pub kind: ElementKind,
    pub amount_cents: i64,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub event_date: Option<NaiveDate>,
    pub period_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Element fields supplied by a creation workflow, before period resolution.
#[derive(Debug, Clone)]
pub struct NewElement {
    pub company_id: Uuid,
    pub driver_id: Uuid,
    pub kind: ElementKind,
    pub amount_cents: i64,
    pub pickup_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub event_date: Option<NaiveDate>,
}

impl NewElement {
    /// The date that decides which period this element belongs to. Loads pick
    /// pickup or delivery per the company criterion; every other kind uses its
    /// event date. `None` means the caller must fall back to "today".
    pub fn relevant_date(&self, criterion: AssignmentCriterion) -> Option<NaiveDate> {
        match self.kind {
            ElementKind::Load => match criterion {
                AssignmentCriterion::PickupDate => self.pickup_date,
                AssignmentCriterion::DeliveryDate => self.delivery_date,
            },
            _ => self.event_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
