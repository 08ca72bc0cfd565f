//! Combined analysis of an existing loan
//!
//! Estimates the implied rate from what the borrower knows (payment and
//! principal or outstanding balance), then simulates the payoff date and
//! the months remaining from today.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::payoff::{simulate_payoff_with, PayoffConfig};
use super::solver::{solve_monthly_rate, SolverConfig};
use crate::calendar::{months_between_with, AVERAGE_DAYS_PER_MONTH};
use crate::error::{LoanError, Result};
use crate::loan::{round_currency, ConventionSelection, RepaymentConvention};

/// Source of the current date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Observed data about an existing loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Date of the first payment
    pub start_date: Option<NaiveDate>,

    pub monthly_payment: Option<f64>,

    /// Original amount borrowed; takes precedence over `remaining_balance`
    pub principal: Option<f64>,

    /// Outstanding balance as of today
    pub remaining_balance: Option<f64>,

    /// Observed or assumed term used when fitting the rate to the principal
    pub term_months: Option<u32>,
}

/// Result of a combined loan analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InversionResult {
    /// Implied annual rate in percent, rounded to 2 decimals
    pub estimated_annual_rate_percent: f64,
    pub payoff_date: NaiveDate,

    /// Average-length months from today until payoff (negative if already past)
    pub remaining_months: i64,

    /// Principal or balance the analysis was based on
    pub principal_amount: f64,
    pub convention: RepaymentConvention,
}

/// Settings for combined analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub solver: SolverConfig,
    pub payoff: PayoffConfig,

    /// Term assumed for rate fitting when none is observed
    pub default_term_months: u32,

    /// Month length used to convert days until payoff into months
    pub days_per_month: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            payoff: PayoffConfig::default(),
            default_term_months: 12,
            days_per_month: AVERAGE_DAYS_PER_MONTH,
        }
    }
}

/// Loan analyzer with its settings and clock
#[derive(Debug, Clone)]
pub struct LoanAnalyzer<C: Clock = SystemClock> {
    config: AnalysisConfig,
    clock: C,
}

impl LoanAnalyzer<SystemClock> {
    /// Analyzer with default settings reading the local date
    pub fn new() -> Self {
        Self::with_clock(AnalysisConfig::default(), SystemClock)
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for LoanAnalyzer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LoanAnalyzer<C> {
    pub fn with_clock(config: AnalysisConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimate rate, payoff date and remaining term for an existing loan.
    ///
    /// Missing start date or payment is rejected directly; failures inside
    /// rate estimation or payoff simulation are reported as
    /// [`LoanError::AnalysisFailed`] with the original error as the cause.
    pub fn analyze(&self, params: &AnalysisParams, selection: ConventionSelection) -> Result<InversionResult> {
        let (start_date, monthly_payment) = match (params.start_date, params.monthly_payment) {
            (Some(start_date), Some(payment)) if payment != 0.0 => (start_date, payment),
            _ => {
                return Err(LoanError::invalid(
                    "start_date, monthly_payment",
                    "start date and monthly payment are required",
                ))
            }
        };

        let convention = selection.resolve();
        let today = self.clock.today();

        // With the original principal the loan runs from its start date and
        // the observed term applies; with only a balance it runs from today.
        let (basis, payoff_start, term) = match (params.principal.filter(|p| *p != 0.0), params.remaining_balance) {
            (Some(principal), _) => (
                principal,
                start_date,
                params.term_months.filter(|m| *m > 0).unwrap_or(self.config.default_term_months),
            ),
            (None, Some(balance)) => (balance, today, self.config.default_term_months),
            (None, None) => {
                return Err(LoanError::invalid(
                    "principal, remaining_balance",
                    "either the principal or the remaining balance is required",
                ))
            }
        };

        let estimate = solve_monthly_rate(&self.config.solver, monthly_payment, basis, term, convention)
            .map_err(LoanError::analysis_failed)?;
        let payoff_date = simulate_payoff_with(
            &self.config.payoff,
            basis,
            monthly_payment,
            estimate.annual_rate_percent,
            payoff_start,
            convention,
        )
        .map_err(LoanError::analysis_failed)?;

        let remaining_months = months_between_with(today, payoff_date, self.config.days_per_month);

        log::info!(
            "Analyzed {} loan: {:.4}% implied, payoff {} ({} months remaining)",
            convention,
            estimate.annual_rate_percent,
            payoff_date,
            remaining_months
        );

        Ok(InversionResult {
            estimated_annual_rate_percent: round_currency(estimate.annual_rate_percent),
            payoff_date,
            remaining_months,
            principal_amount: round_currency(basis),
            convention,
        })
    }
}

/// Analyze an existing loan with default settings and the local date
pub fn analyze_current_loan(params: &AnalysisParams, selection: ConventionSelection) -> Result<InversionResult> {
    LoanAnalyzer::new().analyze(params, selection)
}
