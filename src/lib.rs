//! Loan Analyzer - amortization schedules and implied-rate analysis for fixed-term loans
//!
//! This library provides:
//! - Monthly payments and full repayment schedules for equal payment and
//!   equal principal loans
//! - Repayment convention detection from observed payment histories
//! - Implied interest rate estimation (Newton-Raphson) from an observed payment
//! - Payoff date simulation and combined analysis of an existing loan

pub mod error;
pub mod calendar;
pub mod loan;
pub mod amortization;
pub mod inversion;

// Re-export commonly used types
pub use error::{LoanError, Result};
pub use loan::{ConventionSelection, LoanTerms, RepaymentConvention};
pub use amortization::{
    calculate_totals, compute_monthly_payment, detect_convention, generate_schedule, get_monthly_details, Schedule,
    ScheduleEntry, Totals,
};
pub use inversion::{
    analyze_current_loan, estimate_interest_rate, simulate_payoff, AnalysisConfig, AnalysisParams, InversionResult,
    LoanAnalyzer,
};
