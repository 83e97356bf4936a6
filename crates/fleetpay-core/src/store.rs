//! Relational persistence for the payroll engine, on SQLite.
//!
//! # Schema design
//!
//! `pay_periods` carries `UNIQUE (company_id, start_date)` — that constraint
//! is the sole serialization point for the materializer's insert race
//! (§ concurrency): two writers computing the same boundaries collide on the
//! start date, one wins, the loser re-reads. An overlap pre-check runs inside
//! the same immediate transaction as the insert so custom periods cannot be
//! slipped underneath a regular one either.
//!
//! Mutating operations that must observe a consistent snapshot (close,
//! payout, reassignment) run inside a transaction obtained from
//! [`PayrollStore::transaction`]; the row-level helpers in this module accept
//! any `&Connection` so they work both standalone and inside those
//! transactions.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::calendar::PeriodBounds;
use crate::config::{Company, PayCycleConfig};
use crate::element::{FinancialElement, NewElement};
use crate::error::{PayrollError, Result};
use crate::period::Period;
use crate::settlement::Settlement;
use crate::types::{PayFrequency, PaymentStatus, PeriodKind, PeriodStatus};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id                   BLOB PRIMARY KEY,
    name                 TEXT NOT NULL,
    frequency            TEXT NOT NULL,
    cycle_start_day      INTEGER NOT NULL,
    cycle_origin         TEXT NOT NULL,
    assignment_criterion TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pay_periods (
    id              BLOB PRIMARY KEY,
    company_id      BLOB NOT NULL REFERENCES companies(id),
    start_date      TEXT NOT NULL,
    end_date        TEXT NOT NULL,
    frequency       TEXT NOT NULL,
    kind            TEXT NOT NULL DEFAULT 'regular',
    status          TEXT NOT NULL DEFAULT 'open',
    locked          INTEGER NOT NULL DEFAULT 0,
    recalc_pending  INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (company_id, start_date)
);

CREATE TABLE IF NOT EXISTS financial_elements (
    id            BLOB PRIMARY KEY,
    company_id    BLOB NOT NULL REFERENCES companies(id),
    driver_id     BLOB NOT NULL,
    kind          TEXT NOT NULL,
    amount_cents  INTEGER NOT NULL,
    pickup_date   TEXT,
    delivery_date TEXT,
    event_date    TEXT,
    period_id     BLOB REFERENCES pay_periods(id),
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_elements_period ON financial_elements(period_id);
CREATE INDEX IF NOT EXISTS idx_elements_company ON financial_elements(company_id);

CREATE TABLE IF NOT EXISTS settlements (
    id                BLOB PRIMARY KEY,
    period_id         BLOB NOT NULL REFERENCES pay_periods(id),
    driver_id         BLOB NOT NULL,
    payment_status    TEXT NOT NULL DEFAULT 'pending',
    net_amount_cents  INTEGER NOT NULL DEFAULT 0,
    payment_method    TEXT,
    payment_reference TEXT,
    payment_notes     TEXT,
    paid_at           TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE (period_id, driver_id)
);
CREATE INDEX IF NOT EXISTS idx_settlements_period ON settlements(period_id);
";

const PERIOD_COLS: &str =
    "id, company_id, start_date, end_date, frequency, kind, status, locked, recalc_pending, \
     created_at, updated_at";

const ELEMENT_COLS: &str =
    "id, company_id, driver_id, kind, amount_cents, pickup_date, delivery_date, event_date, \
     period_id, created_at";

const SETTLEMENT_COLS: &str =
    "id, period_id, driver_id, payment_status, net_amount_cents, payment_method, \
     payment_reference, payment_notes, paid_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// PayrollStore
// ---------------------------------------------------------------------------

pub struct PayrollStore {
    conn: Connection,
}

/// Optional filters for [`PayrollStore::list_periods`]. `from`/`to` select
/// periods whose range intersects the given window.
#[derive(Debug, Clone, Default)]
pub struct PeriodFilter {
    pub status: Option<PeriodStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PayrollStore {
    /// Open or create the database at `path` and apply the schema.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        Self::from_conn(Connection::open(path)?)
    }

    /// Fresh in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub(crate) fn transaction(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    // ---------------------------------------------------------------------------
    // Companies
    // ---------------------------------------------------------------------------

    /// Persist a new company. The pay-cycle config is validated and its
    /// biweekly origin normalized onto the configured start weekday.
    pub fn create_company(&self, name: &str, config: PayCycleConfig) -> Result<Company> {
        config.validate()?;
        let config = config.normalized();
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            config,
        };
        self.conn.execute(
            "INSERT INTO companies (id, name, frequency, cycle_start_day, cycle_origin, \
             assignment_criterion) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                company.id,
                company.name,
                company.config.frequency.as_str(),
                company.config.cycle_start_day,
                company.config.cycle_origin,
                company.config.assignment_criterion.as_str(),
            ],
        )?;
        Ok(company)
    }

    pub fn company(&self, id: Uuid) -> Result<Company> {
        company_row(&self.conn, id)
    }

    pub fn update_company_config(&self, id: Uuid, config: PayCycleConfig) -> Result<Company> {
        config.validate()?;
        let config = config.normalized();
        let updated = self.conn.execute(
            "UPDATE companies SET frequency = ?2, cycle_start_day = ?3, cycle_origin = ?4, \
             assignment_criterion = ?5 WHERE id = ?1",
            params![
                id,
                config.frequency.as_str(),
                config.cycle_start_day,
                config.cycle_origin,
                config.assignment_criterion.as_str(),
            ],
        )?;
        if updated == 0 {
            return Err(PayrollError::CompanyNotFound(id));
        }
        company_row(&self.conn, id)
    }

    // ---------------------------------------------------------------------------
    // Periods
    // ---------------------------------------------------------------------------

    /// Insert a period, refusing any interval collision for the company.
    ///
    /// The overlap pre-check and the insert run in one immediate transaction;
    /// the `UNIQUE (company_id, start_date)` constraint backstops writers on
    /// other connections. Both paths surface as [`PayrollError::DuplicatePeriod`].
    pub fn insert_period(
        &mut self,
        company_id: Uuid,
        bounds: PeriodBounds,
        frequency: PayFrequency,
        kind: PeriodKind,
    ) -> Result<Period> {
        let tx = self.transaction()?;
        let collision: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM pay_periods WHERE company_id = ?1 AND start_date <= ?2 \
                 AND end_date >= ?3 LIMIT 1",
                params![company_id, bounds.end, bounds.start],
                |row| row.get(0),
            )
            .optional()?;
        if collision.is_some() {
            return Err(PayrollError::DuplicatePeriod {
                company: company_id,
                start: bounds.start,
            });
        }

        let now = Utc::now();
        let period = Period {
            id: Uuid::new_v4(),
            company_id,
            start_date: bounds.start,
            end_date: bounds.end,
            frequency,
            kind,
            status: PeriodStatus::Open,
            locked: false,
            recalc_pending: false,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO pay_periods (id, company_id, start_date, end_date, frequency, kind, \
             status, locked, recalc_pending, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                period.id,
                period.company_id,
                period.start_date,
                period.end_date,
                period.frequency.as_str(),
                period.kind.as_str(),
                period.status.as_str(),
                period.locked,
                period.recalc_pending,
                period.created_at,
                period.updated_at,
            ],
        )
        .map_err(|e| map_unique_violation(e, company_id, bounds.start))?;
        tx.commit()?;
        Ok(period)
    }

    pub fn period(&self, id: Uuid) -> Result<Period> {
        period_row(&self.conn, id)
    }

    pub fn find_period_containing(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Period>> {
        find_period_containing(&self.conn, company_id, date)
    }

    pub fn list_periods(&self, company_id: Uuid, filter: &PeriodFilter) -> Result<Vec<Period>> {
        let mut sql = format!("SELECT {PERIOD_COLS} FROM pay_periods WHERE company_id = ?1");
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(company_id)];
        if let Some(status) = filter.status {
            values.push(Box::new(status.as_str()));
            sql.push_str(&format!(" AND status = ?{}", values.len()));
        }
        if let Some(from) = filter.from {
            values.push(Box::new(from));
            sql.push_str(&format!(" AND end_date >= ?{}", values.len()));
        }
        if let Some(to) = filter.to {
            values.push(Box::new(to));
            sql.push_str(&format!(" AND start_date <= ?{}", values.len()));
        }
        sql.push_str(" ORDER BY start_date");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
            period_from_row,
        )?;
        let mut periods = Vec::new();
        for row in rows {
            periods.push(row?);
        }
        Ok(periods)
    }

    // ---------------------------------------------------------------------------
    // Financial elements
    // ---------------------------------------------------------------------------

    pub fn insert_element(&self, new: &NewElement, period_id: Uuid) -> Result<FinancialElement> {
        let element = FinancialElement {
            id: Uuid::new_v4(),
            company_id: new.company_id,
            driver_id: new.driver_id,
            kind: new.kind,
            amount_cents: new.amount_cents,
            pickup_date: new.pickup_date,
            delivery_date: new.delivery_date,
            event_date: new.event_date,
            period_id: Some(period_id),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO financial_elements (id, company_id, driver_id, kind, amount_cents, \
             pickup_date, delivery_date, event_date, period_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                element.id,
                element.company_id,
                element.driver_id,
                element.kind.as_str(),
                element.amount_cents,
                element.pickup_date,
                element.delivery_date,
                element.event_date,
                element.period_id,
                element.created_at,
            ],
        )?;
        Ok(element)
    }

    pub fn element(&self, id: Uuid) -> Result<FinancialElement> {
        element_row(&self.conn, id)
    }

    pub fn list_elements(&self, period_id: Uuid) -> Result<Vec<FinancialElement>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ELEMENT_COLS} FROM financial_elements WHERE period_id = ?1 \
             ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![period_id], element_from_row)?;
        let mut elements = Vec::new();
        for row in rows {
            elements.push(row?);
        }
        Ok(elements)
    }

    // ---------------------------------------------------------------------------
    // Settlements
    // ---------------------------------------------------------------------------

    /// Upsert the calculation result for one (period, driver). Keeps a single
    /// row per pair; a paid settlement is final and refuses recalculation.
    pub fn upsert_calculation(
        &mut self,
        period_id: Uuid,
        driver_id: Uuid,
        net_amount_cents: i64,
    ) -> Result<Settlement> {
        let tx = self.transaction()?;
        let now = Utc::now();
        let id = match find_settlement_by_driver(&tx, period_id, driver_id)? {
            Some(existing) => {
                if existing.payment_status == PaymentStatus::Paid {
                    return Err(PayrollError::PaymentNotAllowed {
                        settlement: existing.id,
                        status: existing.payment_status,
                    });
                }
                tx.execute(
                    "UPDATE settlements SET net_amount_cents = ?2, payment_status = ?3, \
                     updated_at = ?4 WHERE id = ?1",
                    params![
                        existing.id,
                        net_amount_cents,
                        PaymentStatus::Calculated.as_str(),
                        now,
                    ],
                )?;
                existing.id
            }
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO settlements (id, period_id, driver_id, payment_status, \
                     net_amount_cents, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        id,
                        period_id,
                        driver_id,
                        PaymentStatus::Calculated.as_str(),
                        net_amount_cents,
                        now,
                        now,
                    ],
                )?;
                id
            }
        };
        let settlement = settlement_row(&tx, id)?;
        tx.commit()?;
        Ok(settlement)
    }

    pub fn settlement(&self, id: Uuid) -> Result<Settlement> {
        settlement_row(&self.conn, id)
    }

    pub fn list_settlements(&self, period_id: Uuid) -> Result<Vec<Settlement>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SETTLEMENT_COLS} FROM settlements WHERE period_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![period_id], settlement_from_row)?;
        let mut settlements = Vec::new();
        for row in rows {
            settlements.push(row?);
        }
        Ok(settlements)
    }

    pub(crate) fn set_settlement_status(&self, id: Uuid, status: PaymentStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE settlements SET payment_status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), Utc::now()],
        )?;
        if updated == 0 {
            return Err(PayrollError::SettlementNotFound(id));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Diagnostics counters
    // ---------------------------------------------------------------------------

    pub(crate) fn unassigned_element_count(&self, company_id: Uuid) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM financial_elements WHERE company_id = ?1 AND period_id IS NULL",
            params![company_id],
            |row| row.get(0),
        )?)
    }

    pub(crate) fn failed_settlement_count(&self, company_id: Uuid) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM settlements s JOIN pay_periods p ON p.id = s.period_id \
             WHERE p.company_id = ?1 AND s.payment_status = 'failed'",
            params![company_id],
            |row| row.get(0),
        )?)
    }

    /// Settlements whose (period, driver) pair has no remaining elements —
    /// typically left behind by reassignment before recalculation runs.
    pub(crate) fn orphaned_settlement_count(&self, company_id: Uuid) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM settlements s JOIN pay_periods p ON p.id = s.period_id \
             WHERE p.company_id = ?1 AND NOT EXISTS (\
                 SELECT 1 FROM financial_elements e \
                 WHERE e.period_id = s.period_id AND e.driver_id = s.driver_id)",
            params![company_id],
            |row| row.get(0),
        )?)
    }

    pub(crate) fn open_period_count(&self, company_id: Uuid) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM pay_periods WHERE company_id = ?1 AND status != 'closed'",
            params![company_id],
            |row| row.get(0),
        )?)
    }
}

// ---------------------------------------------------------------------------
// Row-level helpers (work on a plain connection or inside a transaction)
// ---------------------------------------------------------------------------

pub(crate) fn company_row(conn: &Connection, id: Uuid) -> Result<Company> {
    conn.query_row(
        "SELECT id, name, frequency, cycle_start_day, cycle_origin, assignment_criterion \
         FROM companies WHERE id = ?1",
        params![id],
        |row| {
            Ok(Company {
                id: row.get(0)?,
                name: row.get(1)?,
                config: PayCycleConfig {
                    frequency: parse_col(2, row.get::<_, String>(2)?)?,
                    cycle_start_day: row.get(3)?,
                    cycle_origin: row.get(4)?,
                    assignment_criterion: parse_col(5, row.get::<_, String>(5)?)?,
                },
            })
        },
    )
    .optional()?
    .ok_or(PayrollError::CompanyNotFound(id))
}

pub(crate) fn period_row(conn: &Connection, id: Uuid) -> Result<Period> {
    conn.query_row(
        &format!("SELECT {PERIOD_COLS} FROM pay_periods WHERE id = ?1"),
        params![id],
        period_from_row,
    )
    .optional()?
    .ok_or(PayrollError::PeriodNotFound(id))
}

pub(crate) fn find_period_containing(
    conn: &Connection,
    company_id: Uuid,
    date: NaiveDate,
) -> Result<Option<Period>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {PERIOD_COLS} FROM pay_periods \
                 WHERE company_id = ?1 AND start_date <= ?2 AND end_date >= ?2"
            ),
            params![company_id, date],
            period_from_row,
        )
        .optional()?)
}

pub(crate) fn element_row(conn: &Connection, id: Uuid) -> Result<FinancialElement> {
    conn.query_row(
        &format!("SELECT {ELEMENT_COLS} FROM financial_elements WHERE id = ?1"),
        params![id],
        element_from_row,
    )
    .optional()?
    .ok_or(PayrollError::ElementNotFound(id))
}

pub(crate) fn settlement_row(conn: &Connection, id: Uuid) -> Result<Settlement> {
    conn.query_row(
        &format!("SELECT {SETTLEMENT_COLS} FROM settlements WHERE id = ?1"),
        params![id],
        settlement_from_row,
    )
    .optional()?
    .ok_or(PayrollError::SettlementNotFound(id))
}

pub(crate) fn find_settlement_by_driver(
    conn: &Connection,
    period_id: Uuid,
    driver_id: Uuid,
) -> Result<Option<Settlement>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {SETTLEMENT_COLS} FROM settlements \
                 WHERE period_id = ?1 AND driver_id = ?2"
            ),
            params![period_id, driver_id],
            settlement_from_row,
        )
        .optional()?)
}

pub(crate) fn set_period_status(conn: &Connection, id: Uuid, status: PeriodStatus) -> Result<()> {
    conn.execute(
        "UPDATE pay_periods SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status.as_str(), Utc::now()],
    )?;
    Ok(())
}

pub(crate) fn set_period_locked(conn: &Connection, id: Uuid, locked: bool) -> Result<()> {
    conn.execute(
        "UPDATE pay_periods SET locked = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, locked, Utc::now()],
    )?;
    Ok(())
}

pub(crate) fn set_period_recalc_pending(conn: &Connection, id: Uuid, pending: bool) -> Result<()> {
    conn.execute(
        "UPDATE pay_periods SET recalc_pending = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, pending, Utc::now()],
    )?;
    Ok(())
}

pub(crate) fn set_element_period(conn: &Connection, id: Uuid, period_id: Uuid) -> Result<()> {
    conn.execute(
        "UPDATE financial_elements SET period_id = ?2 WHERE id = ?1",
        params![id, period_id],
    )?;
    Ok(())
}

pub(crate) fn mark_settlement_paid(
    conn: &Connection,
    id: Uuid,
    method: &str,
    reference: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let now = Utc::now();
    conn.execute(
        "UPDATE settlements SET payment_status = ?2, payment_method = ?3, \
         payment_reference = ?4, payment_notes = ?5, paid_at = ?6, updated_at = ?6 \
         WHERE id = ?1",
        params![id, PaymentStatus::Paid.as_str(), method, reference, notes, now],
    )?;
    Ok(())
}

/// Drivers with at least one element in the period who are not fully paid —
/// including drivers that have no settlement row at all.
pub(crate) fn pending_driver_count(conn: &Connection, period_id: Uuid) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(DISTINCT e.driver_id) FROM financial_elements e \
         LEFT JOIN settlements s ON s.period_id = e.period_id AND s.driver_id = e.driver_id \
         WHERE e.period_id = ?1 AND (s.payment_status IS NULL OR s.payment_status != 'paid')",
        params![period_id],
        |row| row.get(0),
    )?)
}

pub(crate) fn failed_settlement_count_period(conn: &Connection, period_id: Uuid) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM settlements WHERE period_id = ?1 AND payment_status = 'failed'",
        params![period_id],
        |row| row.get(0),
    )?)
}

pub(crate) fn settlement_count_period(conn: &Connection, period_id: Uuid) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM settlements WHERE period_id = ?1",
        params![period_id],
        |row| row.get(0),
    )?)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn period_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Period> {
    Ok(Period {
        id: row.get(0)?,
        company_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        frequency: parse_col(4, row.get::<_, String>(4)?)?,
        kind: parse_col(5, row.get::<_, String>(5)?)?,
        status: parse_col(6, row.get::<_, String>(6)?)?,
        locked: row.get(7)?,
        recalc_pending: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn element_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FinancialElement> {
    Ok(FinancialElement {
        id: row.get(0)?,
        company_id: row.get(1)?,
        driver_id: row.get(2)?,
        kind: parse_col(3, row.get::<_, String>(3)?)?,
        amount_cents: row.get(4)?,
        pickup_date: row.get(5)?,
        delivery_date: row.get(6)?,
        event_date: row.get(7)?,
        period_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn settlement_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Settlement> {
    Ok(Settlement {
        id: row.get(0)?,
        period_id: row.get(1)?,
        driver_id: row.get(2)?,
        payment_status: parse_col(3, row.get::<_, String>(3)?)?,
        net_amount_cents: row.get(4)?,
        payment_method: row.get(5)?,
        payment_reference: row.get(6)?,
        payment_notes: row.get(7)?,
        paid_at: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn parse_col<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_unique_violation(e: rusqlite::Error, company: Uuid, start: NaiveDate) -> PayrollError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            PayrollError::DuplicatePeriod { company, start }
        }
        _ => PayrollError::Storage(e),
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::AssignmentCriterion;

    pub(crate) fn weekly_config() -> PayCycleConfig {
        PayCycleConfig {
            frequency: PayFrequency::Weekly,
            cycle_start_day: 1,
            cycle_origin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            assignment_criterion: AssignmentCriterion::PickupDate,
        }
    }

    pub(crate) fn seed_company(store: &mut PayrollStore) -> Company {
        store.create_company("Acme Freight", weekly_config()).unwrap()
    }

    /// [Mon 2024-06-10, Sun 2024-06-16]
    pub(crate) fn sample_bounds() -> PeriodBounds {
        PeriodBounds {
            start: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::element::NewElement;
    use crate::types::ElementKind;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_creates_schema_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = PayrollStore::open(&dir.path().join("payroll.db")).unwrap();
        let company = store.create_company("Acme Freight", weekly_config()).unwrap();
        let loaded = store.company(company.id).unwrap();
        assert_eq!(loaded.name, "Acme Freight");
        assert_eq!(loaded.config, company.config);
    }

    #[test]
    fn company_not_found() {
        let store = PayrollStore::open_in_memory().unwrap();
        assert!(matches!(
            store.company(Uuid::new_v4()),
            Err(PayrollError::CompanyNotFound(_))
        ));
    }

    #[test]
    fn insert_and_find_containing() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        let found = store
            .find_period_containing(company.id, date(2024, 6, 12))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, period.id);

        assert!(store
            .find_period_containing(company.id, date(2024, 6, 17))
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_start_date_is_rejected() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        let err = store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap_err();
        assert!(matches!(err, PayrollError::DuplicatePeriod { .. }));
    }

    #[test]
    fn overlapping_interval_is_rejected() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        // Custom period starting mid-way through the existing one
        let overlap = PeriodBounds {
            start: date(2024, 6, 13),
            end: date(2024, 6, 20),
        };
        let err = store
            .insert_period(company.id, overlap, PayFrequency::Weekly, PeriodKind::Custom)
            .unwrap_err();
        assert!(matches!(err, PayrollError::DuplicatePeriod { .. }));
    }

    #[test]
    fn same_interval_different_companies_coexist() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let a = seed_company(&mut store);
        let b = store.create_company("Blue Haul", weekly_config()).unwrap();
        store
            .insert_period(a.id, sample_bounds(), PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
        store
            .insert_period(b.id, sample_bounds(), PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
    }

    #[test]
    fn list_periods_ordered_and_filtered() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let week2 = PeriodBounds {
            start: date(2024, 6, 17),
            end: date(2024, 6, 23),
        };
        store
            .insert_period(company.id, week2, PayFrequency::Weekly, PeriodKind::Regular)
            .unwrap();
        store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        let all = store
            .list_periods(company.id, &PeriodFilter::default())
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].start_date < all[1].start_date);

        let windowed = store
            .list_periods(
                company.id,
                &PeriodFilter {
                    from: Some(date(2024, 6, 17)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].start_date, date(2024, 6, 17));

        let closed = store
            .list_periods(
                company.id,
                &PeriodFilter {
                    status: Some(PeriodStatus::Closed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(closed.is_empty());
    }

    #[test]
    fn element_roundtrip() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        let new = NewElement {
            company_id: company.id,
            driver_id: Uuid::new_v4(),
            kind: ElementKind::Load,
            amount_cents: 250_000,
            pickup_date: Some(date(2024, 6, 11)),
            delivery_date: Some(date(2024, 6, 13)),
            event_date: None,
        };
        let element = store.insert_element(&new, period.id).unwrap();

        let loaded = store.element(element.id).unwrap();
        assert_eq!(loaded.period_id, Some(period.id));
        assert_eq!(loaded.amount_cents, 250_000);
        assert_eq!(loaded.pickup_date, Some(date(2024, 6, 11)));

        let listed = store.list_elements(period.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, element.id);
    }

    #[test]
    fn pending_driver_count_treats_missing_settlement_as_pending() {
        let mut store = PayrollStore::open_in_memory().unwrap();
        let company = seed_company(&mut store);
        let period = store
            .insert_period(
                company.id,
                sample_bounds(),
                PayFrequency::Weekly,
                PeriodKind::Regular,
            )
            .unwrap();

        let driver = Uuid::new_v4();
        let new = NewElement {
            company_id: company.id,
            driver_id: driver,
            kind: ElementKind::Load,
            amount_cents: 100_000,
            pickup_date: Some(date(2024, 6, 11)),
            delivery_date: None,
            event_date: None,
        };
        store.insert_element(&new, period.id).unwrap();

        // no settlement at all → pending
        assert_eq!(pending_driver_count(&store.conn, period.id).unwrap(), 1);

        let settlement = store
            .upsert_calculation(period.id, driver, 100_000)
            .unwrap();
        assert_eq!(pending_driver_count(&store.conn, period.id).unwrap(), 1);

        store
            .set_settlement_status(settlement.id, PaymentStatus::Paid)
            .unwrap();
        assert_eq!(pending_driver_count(&store.conn, period.id).unwrap(), 0);
    }
}
