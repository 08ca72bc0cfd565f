//! Loan Analyzer CLI
//!
//! Command-line front end for amortization schedules and existing-loan analysis

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use loan_analyzer::amortization::{
    calculate_totals, compute_monthly_payment, detect_convention, detect_convention_by_trend, generate_schedule,
    get_monthly_details, solve_principal,
};
use loan_analyzer::inversion::{
    simulate_payoff_with, solve_monthly_rate, AnalysisConfig, AnalysisParams, LoanAnalyzer,
};
use loan_analyzer::loan::{round_currency, ConventionSelection, RepaymentConvention};

#[derive(Debug, Parser)]
#[command(name = "loan_analyzer", version, about = "Loan amortization and implied-rate analysis")]
struct Cli {
    /// JSON file with solver / payoff / analysis settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Monthly payment for a new loan
    Payment(TermsArgs),
    /// Full repayment schedule with totals
    Schedule {
        #[command(flatten)]
        terms: TermsArgs,
        /// First payment date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Show a single month only
        #[arg(long)]
        month: Option<u32>,
        /// Write the schedule to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Implied annual rate from an observed payment
    Estimate {
        #[arg(long)]
        payment: f64,
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        months: u32,
        #[arg(long, default_value = "equal_payment")]
        convention: RepaymentConvention,
    },
    /// Payoff date for a balance repaid at a fixed payment
    Payoff {
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        payment: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, default_value = "equal_payment")]
        convention: RepaymentConvention,
    },
    /// Estimate rate, payoff date and remaining term of an existing loan
    Analyze {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        payment: Option<f64>,
        #[arg(long)]
        principal: Option<f64>,
        #[arg(long)]
        balance: Option<f64>,
        /// Observed or assumed term for rate fitting
        #[arg(long)]
        months: Option<u32>,
        /// auto, equal_payment or equal_principal
        #[arg(long, default_value = "auto")]
        convention: ConventionSelection,
    },
    /// Classify a payment history as equal payment or equal principal
    Detect {
        /// Observed payments, oldest first
        #[arg(required = true, num_args = 1..)]
        payments: Vec<f64>,
    },
    /// Principal implied by a level payment at a known rate
    Principal {
        #[arg(long)]
        payment: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        months: u32,
    },
}

#[derive(Debug, Args)]
struct TermsArgs {
    #[arg(long)]
    principal: f64,
    /// Annual rate in percent
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    months: u32,
    #[arg(long, default_value = "equal_payment")]
    convention: RepaymentConvention,
}

#[derive(Serialize)]
struct PaymentOutput {
    monthly_payment: f64,
    convention: RepaymentConvention,
}

#[derive(Serialize)]
struct EstimateOutput {
    estimated_annual_rate_percent: f64,
    iterations: u32,
    converged: bool,
}

#[derive(Serialize)]
struct DetectOutput {
    by_variation: RepaymentConvention,
    by_trend: RepaymentConvention,
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Unable to open config {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_schedule_csv(path: &Path, schedule: &loan_analyzer::Schedule) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Unable to create {}", path.display()))?;
    for entry in schedule {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Payment(terms) => {
            let payment = compute_monthly_payment(terms.principal, terms.rate, terms.months, terms.convention)?;
            let output = PaymentOutput {
                monthly_payment: round_currency(payment),
                convention: terms.convention,
            };
            if cli.json {
                print_json(&output)?;
            } else {
                println!("Monthly payment ({}): {:.2}", output.convention, output.monthly_payment);
            }
        }

        Command::Schedule { terms, start, month, csv } => {
            if let Some(month) = month {
                let entry =
                    get_monthly_details(terms.principal, terms.rate, terms.months, month, start, terms.convention)?;
                if cli.json {
                    print_json(&entry)?;
                } else {
                    println!(
                        "Month {:>3} {}: payment {:.2}, principal {:.2}, interest {:.2}, balance {:.2}",
                        entry.month_index,
                        entry.payment_date,
                        entry.payment_amount,
                        entry.principal_component,
                        entry.interest_component,
                        entry.remaining_balance,
                    );
                }
                return Ok(());
            }

            let schedule = generate_schedule(terms.principal, terms.rate, terms.months, start, terms.convention)?;
            let totals = calculate_totals(&schedule);

            if let Some(path) = csv {
                write_schedule_csv(&path, &schedule)?;
                println!("Schedule written to: {}", path.display());
            }

            if cli.json {
                print_json(&serde_json::json!({ "schedule": schedule, "totals": totals }))?;
            } else {
                println!("{:>5} {:>10} {:>14} {:>14} {:>14} {:>16}", "Month", "Date", "Payment", "Principal", "Interest", "Balance");
                println!("{}", "-".repeat(78));
                for entry in &schedule {
                    println!(
                        "{:>5} {:>10} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
                        entry.month_index,
                        entry.payment_date,
                        entry.payment_amount,
                        entry.principal_component,
                        entry.interest_component,
                        entry.remaining_balance,
                    );
                }
                println!("\nTotals:");
                println!("  Total Payment:  {:.2}", totals.total_payment);
                println!("  Total Interest: {:.2}", totals.total_interest);
            }
        }

        Command::Estimate { payment, principal, months, convention } => {
            let estimate = solve_monthly_rate(&config.solver, payment, principal, months, convention)?;
            let output = EstimateOutput {
                estimated_annual_rate_percent: round_currency(estimate.annual_rate_percent),
                iterations: estimate.iterations,
                converged: estimate.converged,
            };
            if cli.json {
                print_json(&output)?;
            } else {
                println!("Estimated annual rate: {:.2}%", output.estimated_annual_rate_percent);
                if !output.converged {
                    println!("  (did not converge after {} iterations; best estimate shown)", output.iterations);
                }
            }
        }

        Command::Payoff { principal, payment, rate, start, convention } => {
            let payoff = simulate_payoff_with(&config.payoff, principal, payment, rate, start, convention)?;
            if cli.json {
                print_json(&serde_json::json!({ "payoff_date": payoff }))?;
            } else {
                println!("Payoff date: {}", payoff);
            }
        }

        Command::Analyze { start, payment, principal, balance, months, convention } => {
            let params = AnalysisParams {
                start_date: start,
                monthly_payment: payment,
                principal,
                remaining_balance: balance,
                term_months: months,
            };
            let result = LoanAnalyzer::with_config(config).analyze(&params, convention)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("Analysis ({}):", result.convention);
                println!("  Estimated Rate:   {:.2}%", result.estimated_annual_rate_percent);
                println!("  Principal Basis:  {:.2}", result.principal_amount);
                println!("  Payoff Date:      {}", result.payoff_date);
                println!("  Remaining Months: {}", result.remaining_months);
            }
        }

        Command::Detect { payments } => {
            let output = DetectOutput {
                by_variation: detect_convention(&payments),
                by_trend: detect_convention_by_trend(&payments),
            };
            if cli.json {
                print_json(&output)?;
            } else {
                println!("By variation: {}", output.by_variation);
                println!("By trend:     {}", output.by_trend);
            }
        }

        Command::Principal { payment, rate, months } => {
            let principal = round_currency(solve_principal(payment, rate, months)?);
            if cli.json {
                print_json(&serde_json::json!({ "principal": principal }))?;
            } else {
                println!("Implied principal: {:.2}", principal);
            }
        }
    }

    Ok(())
}
