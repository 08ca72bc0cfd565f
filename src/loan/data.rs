//! Loan data structures shared by the amortization and inversion engines

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Repayment convention of a fixed-term loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentConvention {
    /// Level total payment; interest share shrinks, principal share grows
    EqualPayment,
    /// Level principal share; total payment declines with the balance
    EqualPrincipal,
}

impl RepaymentConvention {
    /// Tag used in CSV files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            RepaymentConvention::EqualPayment => "equal_payment",
            RepaymentConvention::EqualPrincipal => "equal_principal",
        }
    }
}

impl Default for RepaymentConvention {
    fn default() -> Self {
        RepaymentConvention::EqualPayment
    }
}

impl fmt::Display for RepaymentConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepaymentConvention {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "equal_payment" => Ok(RepaymentConvention::EqualPayment),
            "equal_principal" => Ok(RepaymentConvention::EqualPrincipal),
            other => Err(LoanError::UnsupportedConvention(other.to_string())),
        }
    }
}

/// Convention argument for combined loan analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionSelection {
    /// Resolve from the available data
    Auto,
    Known(RepaymentConvention),
}

impl ConventionSelection {
    /// Resolve to a concrete convention.
    ///
    /// No payment history is available on the analysis path, so `Auto`
    /// always resolves to equal payment.
    pub fn resolve(&self) -> RepaymentConvention {
        match self {
            ConventionSelection::Auto => RepaymentConvention::EqualPayment,
            ConventionSelection::Known(convention) => *convention,
        }
    }
}

impl Default for ConventionSelection {
    fn default() -> Self {
        ConventionSelection::Auto
    }
}

impl From<RepaymentConvention> for ConventionSelection {
    fn from(convention: RepaymentConvention) -> Self {
        ConventionSelection::Known(convention)
    }
}

impl FromStr for ConventionSelection {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "auto" => Ok(ConventionSelection::Auto),
            other => other.parse().map(ConventionSelection::Known),
        }
    }
}

/// Terms of a fixed-rate, fixed-term loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual rate in percent (3.0 = 3%)
    pub annual_rate_percent: f64,

    /// Number of monthly payments
    pub term_months: u32,

    /// Date of the first payment
    pub start_date: NaiveDate,

    pub convention: RepaymentConvention,
}

impl LoanTerms {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        term_months: u32,
        start_date: NaiveDate,
        convention: RepaymentConvention,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            start_date,
            convention,
        }
    }

    /// Monthly rate as a decimal (3% annual -> 0.0025)
    pub fn monthly_rate(&self) -> f64 {
        monthly_rate(self.annual_rate_percent)
    }

    /// Check the principal, rate and term constraints
    pub fn validate(&self) -> Result<()> {
        validate_terms(self.principal, self.annual_rate_percent, self.term_months)
    }
}

/// Convert an annual percentage rate to a monthly decimal rate
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

/// Round a monetary amount to 2 decimal places
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn validate_terms(principal: f64, annual_rate_percent: f64, term_months: u32) -> Result<()> {
    // NaN fails every comparison, so test for the valid range
    if !(principal > 0.0) || !principal.is_finite() {
        return Err(LoanError::invalid("principal", format!("must be positive, got {}", principal)));
    }
    if !(annual_rate_percent >= 0.0) || !annual_rate_percent.is_finite() {
        return Err(LoanError::invalid(
            "annual_rate_percent",
            format!("must be non-negative, got {}", annual_rate_percent),
        ));
    }
    if term_months == 0 {
        return Err(LoanError::invalid("term_months", "must be at least 1"));
    }
    Ok(())
}
