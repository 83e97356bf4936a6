use crate::output::{print_json, print_table};
use clap::Subcommand;
use fleetpay_core::settlement;
use fleetpay_core::store::PayrollStore;
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum SettlementSubcommand {
    /// Record a calculation result for one driver in a period
    Record {
        period: Uuid,
        #[arg(long)]
        driver: Uuid,
        /// Net amount in cents
        #[arg(long)]
        amount: i64,
    },
    /// Mark a settlement as failed so the close preconditions surface it
    Fail { id: Uuid },
    /// List the settlements of a period
    List { period: Uuid },
}

pub fn run(db: &Path, subcmd: SettlementSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = PayrollStore::open(db)?;
    match subcmd {
        SettlementSubcommand::Record {
            period,
            driver,
            amount,
        } => {
            let settlement = settlement::record_calculation(&mut store, period, driver, amount)?;
            if json {
                print_json(&settlement)?;
            } else {
                println!(
                    "settlement {} for driver {}: {} ({:.2})",
                    settlement.id,
                    settlement.driver_id,
                    settlement.payment_status,
                    settlement.net_amount_cents as f64 / 100.0
                );
            }
            Ok(())
        }
        SettlementSubcommand::Fail { id } => {
            let settlement = settlement::record_failure(&mut store, id)?;
            if json {
                print_json(&settlement)?;
            } else {
                println!("settlement {} marked {}", settlement.id, settlement.payment_status);
            }
            Ok(())
        }
        SettlementSubcommand::List { period } => {
            let settlements = store.list_settlements(period)?;
            if json {
                print_json(&settlements)?;
            } else {
                let rows = settlements
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            s.driver_id.to_string(),
                            s.payment_status.to_string(),
                            format!("{:.2}", s.net_amount_cents as f64 / 100.0),
                            s.paid_at
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_else(|| "-".into()),
                        ]
                    })
                    .collect();
                print_table(&["id", "driver", "status", "net", "paid_at"], rows);
            }
            Ok(())
        }
    }
}
