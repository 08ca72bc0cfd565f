//! Payoff date simulation for a loan with a fixed monthly payment

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::error::{LoanError, Result};
use crate::loan::{monthly_rate, RepaymentConvention};

/// Limits for payoff simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    /// Longest repayment simulated before giving up
    pub max_months: u32,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            max_months: 600, // 50 years
        }
    }
}

/// Date on which a balance is repaid by a fixed monthly payment
pub fn simulate_payoff(
    principal: f64,
    monthly_payment: f64,
    annual_rate_percent: f64,
    start_date: NaiveDate,
    convention: RepaymentConvention,
) -> Result<NaiveDate> {
    simulate_payoff_with(
        &PayoffConfig::default(),
        principal,
        monthly_payment,
        annual_rate_percent,
        start_date,
        convention,
    )
}

/// Payoff simulation with explicit limits.
///
/// Both conventions apply the same payment each month: interest accrues on
/// the running balance and the remainder of the payment reduces it.
pub fn simulate_payoff_with(
    config: &PayoffConfig,
    principal: f64,
    monthly_payment: f64,
    annual_rate_percent: f64,
    start_date: NaiveDate,
    convention: RepaymentConvention,
) -> Result<NaiveDate> {
    let months = months_to_payoff(config, principal, monthly_payment, annual_rate_percent)?;
    log::debug!(
        "{} balance {:.2} repaid in {} months at {:.4}%",
        convention,
        principal,
        months,
        annual_rate_percent
    );
    add_months(start_date, months)
}

/// Number of monthly payments needed to clear `principal`
pub fn months_to_payoff(
    config: &PayoffConfig,
    principal: f64,
    monthly_payment: f64,
    annual_rate_percent: f64,
) -> Result<u32> {
    if !(monthly_payment > 0.0) {
        return Err(LoanError::invalid(
            "monthly_payment",
            format!("must be positive, got {}", monthly_payment),
        ));
    }
    if !(principal > 0.0) {
        return Err(LoanError::invalid("principal", format!("must be positive, got {}", principal)));
    }
    if !(annual_rate_percent >= 0.0) {
        return Err(LoanError::invalid(
            "annual_rate_percent",
            format!("must be non-negative, got {}", annual_rate_percent),
        ));
    }

    let rate = monthly_rate(annual_rate_percent);
    let mut balance = principal;
    let mut month = 0;

    while balance > 0.0 && month < config.max_months {
        month += 1;

        let interest = balance * rate;
        let principal_part = monthly_payment - interest;
        if principal_part <= 0.0 {
            return Err(LoanError::UnpayableLoan {
                month,
                payment: monthly_payment,
                interest,
            });
        }

        balance = (balance - principal_part).max(0.0);
    }

    if balance > 0.0 {
        return Err(LoanError::ExcessiveTerm {
            max_months: config.max_months,
        });
    }

    Ok(month)
}
