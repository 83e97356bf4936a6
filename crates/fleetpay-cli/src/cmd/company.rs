use crate::output::{print_json, print_table};
use chrono::NaiveDate;
use clap::Subcommand;
use fleetpay_core::config::PayCycleConfig;
use fleetpay_core::store::PayrollStore;
use fleetpay_core::types::{AssignmentCriterion, PayFrequency};
use std::path::Path;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum CompanySubcommand {
    /// Register a company and its pay-cycle configuration
    Create {
        /// Company display name
        #[arg(long)]
        name: String,
        /// weekly | biweekly | monthly
        #[arg(long)]
        frequency: PayFrequency,
        /// Weekday 1=Mon..7=Sun (weekly/biweekly) or day-of-month (monthly)
        #[arg(long = "start-day")]
        start_day: u32,
        /// Anchor origin for the biweekly grid (usually the onboarding date)
        #[arg(long)]
        origin: NaiveDate,
        /// pickup_date | delivery_date
        #[arg(long, default_value = "pickup_date")]
        criterion: AssignmentCriterion,
    },
    /// Show a company's pay-cycle configuration
    Show { id: Uuid },
    /// Update parts of a company's pay-cycle configuration
    SetConfig {
        id: Uuid,
        #[arg(long)]
        frequency: Option<PayFrequency>,
        #[arg(long = "start-day")]
        start_day: Option<u32>,
        #[arg(long)]
        origin: Option<NaiveDate>,
        #[arg(long)]
        criterion: Option<AssignmentCriterion>,
    },
}

pub fn run(db: &Path, subcmd: CompanySubcommand, json: bool) -> anyhow::Result<()> {
    let store = PayrollStore::open(db)?;
    match subcmd {
        CompanySubcommand::Create {
            name,
            frequency,
            start_day,
            origin,
            criterion,
        } => {
            let company = store.create_company(
                &name,
                PayCycleConfig {
                    frequency,
                    cycle_start_day: start_day,
                    cycle_origin: origin,
                    assignment_criterion: criterion,
                },
            )?;
            if json {
                print_json(&company)?;
            } else {
                println!("created company {} ({})", company.name, company.id);
            }
            Ok(())
        }
        CompanySubcommand::Show { id } => {
            let company = store.company(id)?;
            if json {
                print_json(&company)?;
            } else {
                print_table(
                    &["field", "value"],
                    vec![
                        vec!["id".into(), company.id.to_string()],
                        vec!["name".into(), company.name.clone()],
                        vec!["frequency".into(), company.config.frequency.to_string()],
                        vec![
                            "cycle_start_day".into(),
                            company.config.cycle_start_day.to_string(),
                        ],
                        vec!["cycle_origin".into(), company.config.cycle_origin.to_string()],
                        vec![
                            "assignment_criterion".into(),
                            company.config.assignment_criterion.to_string(),
                        ],
                    ],
                );
            }
            Ok(())
        }
        CompanySubcommand::SetConfig {
            id,
            frequency,
            start_day,
            origin,
            criterion,
        } => {
            let current = store.company(id)?;
            let config = PayCycleConfig {
                frequency: frequency.unwrap_or(current.config.frequency),
                cycle_start_day: start_day.unwrap_or(current.config.cycle_start_day),
                cycle_origin: origin.unwrap_or(current.config.cycle_origin),
                assignment_criterion: criterion.unwrap_or(current.config.assignment_criterion),
            };
            let updated = store.update_company_config(id, config)?;
            if json {
                print_json(&updated)?;
            } else {
                println!(
                    "updated config for {}: {} starting day {}",
                    updated.name, updated.config.frequency, updated.config.cycle_start_day
                );
            }
            Ok(())
        }
    }
}
