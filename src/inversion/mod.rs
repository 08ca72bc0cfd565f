//! Rate inversion engine: implied rate, payoff date and combined analysis

mod analysis;
mod payoff;
mod solver;

pub use analysis::{
    analyze_current_loan, AnalysisConfig, AnalysisParams, Clock, FixedClock, InversionResult, LoanAnalyzer,
    SystemClock,
};
pub use payoff::{months_to_payoff, simulate_payoff, simulate_payoff_with, PayoffConfig};
pub use solver::{estimate_interest_rate, solve_monthly_rate, RateEstimate, SolverConfig};
