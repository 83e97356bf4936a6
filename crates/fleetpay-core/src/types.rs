use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PayFrequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl PayFrequency {
    pub fn all() -> &'static [PayFrequency] {
        &[
            PayFrequency::Weekly,
            PayFrequency::Biweekly,
            PayFrequency::Monthly,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PayFrequency {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(PayFrequency::Weekly),
            "biweekly" => Ok(PayFrequency::Biweekly),
            "monthly" => Ok(PayFrequency::Monthly),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown pay frequency: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PeriodStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    Processing,
    Closed,
}

impl PeriodStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodStatus::Open => "open",
            PeriodStatus::Processing => "processing",
            PeriodStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodStatus {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(PeriodStatus::Open),
            "processing" => Ok(PeriodStatus::Processing),
            "closed" => Ok(PeriodStatus::Closed),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown period status: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PeriodKind
// ---------------------------------------------------------------------------

/// Regular periods come out of the calculator's cadence grid; custom periods
/// are off-cycle ranges inserted by an operator (bonus runs, corrections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Regular,
    Custom,
}

impl PeriodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodKind::Regular => "regular",
            PeriodKind::Custom => "custom",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PeriodKind {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(PeriodKind::Regular),
            "custom" => Ok(PeriodKind::Custom),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown period kind: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Calculated,
    Approved,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Whether a settlement in this status may be marked paid.
    pub fn is_payable(self) -> bool {
        matches!(self, PaymentStatus::Calculated | PaymentStatus::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Calculated => "calculated",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "calculated" => Ok(PaymentStatus::Calculated),
            "approved" => Ok(PaymentStatus::Approved),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown payment status: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ElementKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Load,
    FuelExpense,
    Deduction,
    OtherIncome,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Load => "load",
            ElementKind::FuelExpense => "fuel_expense",
            ElementKind::Deduction => "deduction",
            ElementKind::OtherIncome => "other_income",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load" => Ok(ElementKind::Load),
            "fuel_expense" => Ok(ElementKind::FuelExpense),
            "deduction" => Ok(ElementKind::Deduction),
            "other_income" => Ok(ElementKind::OtherIncome),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown element kind: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentCriterion
// ---------------------------------------------------------------------------

/// Which date field of a load decides the period it lands in. Non-load
/// elements always use their own event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentCriterion {
    PickupDate,
    DeliveryDate,
}

impl AssignmentCriterion {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentCriterion::PickupDate => "pickup_date",
            AssignmentCriterion::DeliveryDate => "delivery_date",
        }
    }
}

impl fmt::Display for AssignmentCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentCriterion {
    type Err = crate::error::PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup_date" => Ok(AssignmentCriterion::PickupDate),
            "delivery_date" => Ok(AssignmentCriterion::DeliveryDate),
            _ => Err(crate::error::PayrollError::Validation(format!(
                "unknown assignment criterion: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// CloseBlockReason
// ---------------------------------------------------------------------------

/// Why a close attempt was refused. Checked in this order; the first failing
/// condition wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseBlockReason {
    /// A driver with at least one assigned element is not yet paid.
    PendingDrivers,
    /// A settlement in the period has failed and needs attention.
    FailedPayments,
    /// No settlements exist; an empty period cannot be closed.
    EmptyPeriod,
}

impl CloseBlockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseBlockReason::PendingDrivers => "pending_drivers",
            CloseBlockReason::FailedPayments => "failed_payments",
            CloseBlockReason::EmptyPeriod => "empty_period",
        }
    }
}

impl fmt::Display for CloseBlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DiagnosticStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStatus {
    Normal,
    NeedsAttention,
}

impl fmt::Display for DiagnosticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticStatus::Normal => "normal",
            DiagnosticStatus::NeedsAttention => "needs_attention",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
