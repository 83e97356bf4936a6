use crate::output::{print_json, print_table};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use fleetpay_core::period::Period;
use fleetpay_core::settlement::NoopCalculator;
use fleetpay_core::store::{PayrollStore, PeriodFilter};
use fleetpay_core::types::PeriodStatus;
use fleetpay_core::{lifecycle, materialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum PeriodSubcommand {
    /// Materialize (or fetch) the period covering a date
    Ensure {
        company: Uuid,
        /// Target date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List a company's materialized periods
    List {
        company: Uuid,
        #[arg(long)]
        status: Option<PeriodStatus>,
        /// Only periods ending on or after this date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Only periods starting on or before this date
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show previous/current/next computed periods without persisting them
    Preview {
        company: Uuid,
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Close a period (all drivers paid, none failed, at least one settled)
    Close { id: Uuid },
    /// Report whether a period could close right now, and if not, why
    CanClose { id: Uuid },
    /// Lock a closed period against further mutation
    Lock { id: Uuid },
    /// Remove the lock from a period
    Unlock { id: Uuid },
    /// Payroll health snapshot for a company
    Diagnose { company: Uuid },
}

pub fn run(db: &Path, subcmd: PeriodSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = PayrollStore::open(db)?;
    match subcmd {
        PeriodSubcommand::Ensure { company, date } => {
            let target = date.unwrap_or_else(|| Local::now().date_naive());
            let period =
                materialize::ensure_period(&mut store, &NoopCalculator, company, target)?;
            emit_period(&period, json)
        }
        PeriodSubcommand::List {
            company,
            status,
            from,
            to,
        } => {
            let periods = store.list_periods(company, &PeriodFilter { status, from, to })?;
            if json {
                print_json(&periods)?;
            } else {
                let rows = periods
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.label(),
                            p.start_date.to_string(),
                            p.end_date.to_string(),
                            p.status.to_string(),
                            p.kind.to_string(),
                            if p.locked { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                print_table(
                    &["id", "label", "start", "end", "status", "kind", "locked"],
                    rows,
                );
            }
            Ok(())
        }
        PeriodSubcommand::Preview { company, date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let ahead = materialize::lookahead(&store, company, today)?;
            if json {
                print_json(&ahead)?;
            } else {
                let rows = [&ahead.previous, &ahead.current, &ahead.next]
                    .iter()
                    .map(|p| {
                        vec![
                            format!("{:?}", p.position).to_lowercase(),
                            p.label(),
                            p.bounds.start.to_string(),
                            p.bounds.end.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["position", "label", "start", "end"], rows);
            }
            Ok(())
        }
        PeriodSubcommand::Close { id } => {
            let period = lifecycle::close_period(&mut store, id)?;
            emit_period(&period, json)
        }
        PeriodSubcommand::CanClose { id } => {
            let blocker = lifecycle::can_close(&store, id)?;
            if json {
                print_json(&blocker)?;
            } else {
                match blocker {
                    None => println!("period {id} can close"),
                    Some(reason) => println!("period {id} cannot close: {reason}"),
                }
            }
            Ok(())
        }
        PeriodSubcommand::Lock { id } => {
            let period = lifecycle::lock_period(&mut store, id)?;
            emit_period(&period, json)
        }
        PeriodSubcommand::Unlock { id } => {
            let period = lifecycle::unlock_period(&mut store, id)?;
            emit_period(&period, json)
        }
        PeriodSubcommand::Diagnose { company } => {
            let report = lifecycle::diagnose(&store, company)?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "status: {} — {} open period(s), {} unassigned element(s), \
                     {} failed settlement(s), {} orphaned settlement(s)",
                    report.status,
                    report.open_periods,
                    report.unassigned_elements,
                    report.failed_settlements,
                    report.orphaned_settlements
                );
            }
            Ok(())
        }
    }
}

fn emit_period(period: &Period, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(period)?;
    } else {
        println!(
            "{} {} [{} .. {}] status={} locked={}",
            period.id,
            period.label(),
            period.start_date,
            period.end_date,
            period.status,
            period.locked
        );
    }
    Ok(())
}
