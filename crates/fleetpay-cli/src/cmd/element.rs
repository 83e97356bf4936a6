use crate::output::{print_json, print_table};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use fleetpay_core::element::NewElement;
use fleetpay_core::settlement::NoopCalculator;
use fleetpay_core::store::PayrollStore;
use fleetpay_core::types::ElementKind;
use fleetpay_core::{assign, reassign};
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ElementSubcommand {
    /// Create a financial element; its pay period is resolved on the spot
    Add {
        company: Uuid,
        #[arg(long)]
        driver: Uuid,
        /// load | fuel_expense | deduction | other_income
        #[arg(long)]
        kind: ElementKind,
        /// Amount in cents
        #[arg(long)]
        amount: i64,
        #[arg(long = "pickup-date")]
        pickup_date: Option<NaiveDate>,
        #[arg(long = "delivery-date")]
        delivery_date: Option<NaiveDate>,
        /// Relevant date for non-load elements
        #[arg(long = "event-date")]
        event_date: Option<NaiveDate>,
    },
    /// List the elements assigned to a period
    List { period: Uuid },
    /// Move an element into another period (flags both for recalculation)
    Reassign {
        id: Uuid,
        #[arg(long = "to-period")]
        to_period: Uuid,
    },
}

pub fn run(db: &Path, subcmd: ElementSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = PayrollStore::open(db)?;
    match subcmd {
        ElementSubcommand::Add {
            company,
            driver,
            kind,
            amount,
            pickup_date,
            delivery_date,
            event_date,
        } => {
            let element = assign::resolve_and_create(
                &mut store,
                &NoopCalculator,
                NewElement {
                    company_id: company,
                    driver_id: driver,
                    kind,
                    amount_cents: amount,
                    pickup_date,
                    delivery_date,
                    event_date,
                },
                Local::now().date_naive(),
            )?;
            if json {
                print_json(&element)?;
            } else {
                println!(
                    "created {} {} for driver {} in period {}",
                    element.kind,
                    element.id,
                    element.driver_id,
                    element
                        .period_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".into())
                );
            }
            Ok(())
        }
        ElementSubcommand::List { period } => {
            let elements = store.list_elements(period)?;
            if json {
                print_json(&elements)?;
            } else {
                let rows = elements
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.to_string(),
                            e.kind.to_string(),
                            e.driver_id.to_string(),
                            format!("{:.2}", e.amount_cents as f64 / 100.0),
                            e.pickup_date
                                .or(e.event_date)
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "-".into()),
                        ]
                    })
                    .collect();
                print_table(&["id", "kind", "driver", "amount", "date"], rows);
            }
            Ok(())
        }
        ElementSubcommand::Reassign { id, to_period } => {
            let element = reassign::reassign(&mut store, id, to_period)?;
            if json {
                print_json(&element)?;
            } else {
                println!("element {} moved to period {}", element.id, to_period);
            }
            Ok(())
        }
    }
}
