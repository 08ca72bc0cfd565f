//! Implied interest rate estimation
//!
//! Inverts the payment formula with Newton-Raphson to recover the monthly
//! rate that reproduces an observed payment.

use serde::{Deserialize, Serialize};

use crate::amortization::payment_for_rate;
use crate::error::{LoanError, Result};
use crate::loan::RepaymentConvention;

/// Newton-Raphson settings for rate estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting monthly rate (0.005 = 0.5% per month)
    pub initial_guess: f64,

    /// Convergence threshold on |computed payment - observed payment|
    pub tolerance: f64,

    pub max_iterations: u32,

    /// Step for the forward-difference derivative
    pub derivative_step: f64,

    /// Stop iterating when |f'(r)| falls below this
    pub min_derivative: f64,

    /// Lower clamp on the monthly rate after each update
    pub min_monthly_rate: f64,

    /// Upper clamp on the monthly rate after each update
    pub max_monthly_rate: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.005,
            tolerance: 1e-8,
            max_iterations: 100,
            derivative_step: 1e-8,
            min_derivative: 1e-10,
            min_monthly_rate: 1e-10,
            max_monthly_rate: 0.5, // 50% per month
        }
    }
}

/// Outcome of a single rate estimation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Monthly rate as a decimal
    pub monthly_rate: f64,

    /// Annualized rate in percent, floored at zero
    pub annual_rate_percent: f64,

    /// Newton steps taken
    pub iterations: u32,

    /// Whether the payment residual fell within tolerance
    pub converged: bool,
}

impl RateEstimate {
    fn new(monthly_rate: f64, iterations: u32, converged: bool) -> Self {
        Self {
            monthly_rate,
            annual_rate_percent: (monthly_rate * 12.0 * 100.0).max(0.0),
            iterations,
            converged,
        }
    }
}

/// Estimate the annual rate (percent) implied by an observed monthly payment.
///
/// For equal principal loans the observed payment is matched against the
/// first month's payment only.
pub fn estimate_interest_rate(
    monthly_payment: f64,
    principal: f64,
    months: u32,
    convention: RepaymentConvention,
) -> Result<f64> {
    solve_monthly_rate(&SolverConfig::default(), monthly_payment, principal, months, convention)
        .map(|estimate| estimate.annual_rate_percent)
}

/// Run the Newton-Raphson search with explicit settings.
///
/// Failing to converge is not an error: the last iterate is returned with
/// `converged = false`.
pub fn solve_monthly_rate(
    config: &SolverConfig,
    monthly_payment: f64,
    principal: f64,
    months: u32,
    convention: RepaymentConvention,
) -> Result<RateEstimate> {
    if !(monthly_payment > 0.0) {
        return Err(LoanError::invalid(
            "monthly_payment",
            format!("must be positive, got {}", monthly_payment),
        ));
    }
    if !(principal > 0.0) {
        return Err(LoanError::invalid("principal", format!("must be positive, got {}", principal)));
    }
    if months == 0 {
        return Err(LoanError::invalid("months", "must be at least 1"));
    }

    let residual = |r: f64| payment_for_rate(principal, r, months, convention) - monthly_payment;

    let mut rate = config.initial_guess;
    for iteration in 0..config.max_iterations {
        let error = residual(rate);
        if error.abs() < config.tolerance {
            log::debug!("Rate converged to {:.10} after {} iterations", rate, iteration);
            return Ok(RateEstimate::new(rate, iteration, true));
        }

        let derivative = match convention {
            RepaymentConvention::EqualPayment => {
                let h = config.derivative_step;
                (residual(rate + h) - error) / h
            }
            // First-month payment is linear in the rate
            RepaymentConvention::EqualPrincipal => principal,
        };

        if derivative.abs() < config.min_derivative {
            log::warn!(
                "Rate search stalled at monthly rate {:.10} (derivative {:e}); using best estimate",
                rate,
                derivative
            );
            return Ok(RateEstimate::new(rate, iteration, false));
        }

        rate = (rate - error / derivative).clamp(config.min_monthly_rate, config.max_monthly_rate);
    }

    log::warn!(
        "Rate search did not converge in {} iterations; using best estimate {:.10}",
        config.max_iterations,
        rate
    );
    Ok(RateEstimate::new(rate, config.max_iterations, false))
}
