use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CycleAnchor;
use crate::error::{PayrollError, Result};
use crate::types::{AssignmentCriterion, PayFrequency};

// ---------------------------------------------------------------------------
// PayCycleConfig
// ---------------------------------------------------------------------------

/// Per-company payroll cadence configuration.
///
/// `cycle_start_day` means a weekday (1 = Monday .. 7 = Sunday) for weekly and
/// biweekly cadences, and a day-of-month (1..=31, clamped in short months) for
/// monthly. `cycle_origin` pins the biweekly grid to a fixed date — typically
/// the company's onboarding date — so period boundaries never shift across
/// month or year rollovers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayCycleConfig {
    pub frequency: PayFrequency,
    pub cycle_start_day: u32,
    pub cycle_origin: NaiveDate,
    pub assignment_criterion: AssignmentCriterion,
}

impl PayCycleConfig {
    pub fn validate(&self) -> Result<()> {
        match self.frequency {
            PayFrequency::Weekly | PayFrequency::Biweekly => {
                if !(1..=7).contains(&self.cycle_start_day) {
                    return Err(PayrollError::Validation(format!(
                        "cycle_start_day must be a weekday 1..=7 for {} cadence, got {}",
                        self.frequency, self.cycle_start_day
                    )));
                }
            }
            PayFrequency::Monthly => {
                if !(1..=31).contains(&self.cycle_start_day) {
                    return Err(PayrollError::Validation(format!(
                        "cycle_start_day must be a day-of-month 1..=31, got {}",
                        self.cycle_start_day
                    )));
                }
            }
        }
        Ok(())
    }

    /// Roll `cycle_origin` back to the most recent date whose weekday matches
    /// `cycle_start_day`, so the biweekly grid starts on the configured
    /// weekday. No-op for monthly cadence and for already-aligned origins.
    pub fn normalized(mut self) -> Self {
        if matches!(
            self.frequency,
            PayFrequency::Weekly | PayFrequency::Biweekly
        ) && (1..=7).contains(&self.cycle_start_day)
        {
            let have = self.cycle_origin.weekday().number_from_monday();
            let back = (have + 7 - self.cycle_start_day) % 7;
            self.cycle_origin -= Duration::days(i64::from(back));
        }
        self
    }

    pub fn anchor(&self) -> CycleAnchor {
        CycleAnchor {
            start_day: self.cycle_start_day,
            origin: self.cycle_origin,
        }
    }
}

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub config: PayCycleConfig,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
