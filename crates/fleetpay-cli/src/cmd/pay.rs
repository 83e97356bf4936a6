use crate::output::print_json;
use fleetpay_core::payout::{mark_many_paid, PayoutRequest};
use fleetpay_core::store::PayrollStore;
use std::path::Path;
use uuid::Uuid;

/// Batch mark-paid. Items fail independently; afterwards every touched
/// period that satisfies its close preconditions is closed automatically.
pub fn run(
    db: &Path,
    ids: Vec<Uuid>,
    method: String,
    reference: Option<String>,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut store = PayrollStore::open(db)?;
    let report = mark_many_paid(
        &mut store,
        &PayoutRequest {
            settlement_ids: ids,
            method,
            reference,
            notes,
        },
    )?;

    if json {
        print_json(&report)?;
    } else {
        println!(
            "paid {} settlement(s), {} error(s)",
            report.success_count, report.error_count
        );
        for err in &report.errors {
            println!("  {}: {}", err.settlement_id, err.message);
        }
        for period in &report.closed_periods {
            println!("period {period} closed automatically");
        }
    }
    Ok(())
}
