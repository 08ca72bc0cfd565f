//! Analyze a book of existing loans from CSV
//!
//! Usage: analyze_batch <loans.csv> [output.csv]
//!
//! Each loan is analyzed independently in parallel. Loans that cannot be
//! analyzed are written with their error message instead of results.
//! Set ANALYSIS_AS_OF=YYYY-MM-DD to fix "today" for reproducible output.

use std::env;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use loan_analyzer::inversion::{AnalysisConfig, Clock, FixedClock, LoanAnalyzer, SystemClock};
use loan_analyzer::loan::{load_loans, LoanRecord};

/// One output row per input loan
#[derive(Debug, Serialize)]
struct BatchRow {
    loan_id: String,
    estimated_annual_rate_percent: Option<f64>,
    payoff_date: Option<NaiveDate>,
    remaining_months: Option<i64>,
    principal_amount: Option<f64>,
    convention: Option<String>,
    error: Option<String>,
}

fn analyze_all<C: Clock + Sync>(analyzer: &LoanAnalyzer<C>, loans: &[LoanRecord]) -> Vec<BatchRow> {
    loans
        .par_iter()
        .map(|loan| match analyzer.analyze(&loan.params, loan.convention) {
            Ok(result) => BatchRow {
                loan_id: loan.loan_id.clone(),
                estimated_annual_rate_percent: Some(result.estimated_annual_rate_percent),
                payoff_date: Some(result.payoff_date),
                remaining_months: Some(result.remaining_months),
                principal_amount: Some(result.principal_amount),
                convention: Some(result.convention.to_string()),
                error: None,
            },
            Err(err) => {
                log::warn!("Loan {}: {}", loan.loan_id, err);
                BatchRow {
                    loan_id: loan.loan_id.clone(),
                    estimated_annual_rate_percent: None,
                    payoff_date: None,
                    remaining_months: None,
                    principal_amount: None,
                    convention: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: {} <loans.csv> [output.csv]", args[0]);
    }
    let input_path = &args[1];
    let output_path = args.get(2).map(String::as_str).unwrap_or("loan_analysis_output.csv");

    let start = Instant::now();
    println!("Loading loans from {}...", input_path);
    let loans = load_loans(input_path).with_context(|| format!("Failed to load loans from {}", input_path))?;
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let config = AnalysisConfig::default();
    let rows = match env::var("ANALYSIS_AS_OF") {
        Ok(as_of) => {
            let today = as_of
                .parse::<NaiveDate>()
                .with_context(|| format!("Invalid ANALYSIS_AS_OF date: {}", as_of))?;
            analyze_all(&LoanAnalyzer::with_clock(config, FixedClock(today)), &loans)
        }
        Err(_) => analyze_all(&LoanAnalyzer::with_clock(config, SystemClock), &loans),
    };

    let failed = rows.iter().filter(|r| r.error.is_some()).count();

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create output file {}", output_path))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Output written to {}", output_path);
    println!("\nBatch Summary:");
    println!("  Analyzed: {}", rows.len() - failed);
    println!("  Failed:   {}", failed);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
