//! Forward amortization engine: payments, schedules and totals

mod detect;
mod engine;
mod schedule;

pub use detect::{detect_convention, detect_convention_by_trend, DECLINING_TREND_THRESHOLD, LEVEL_PAYMENT_CV_THRESHOLD};
pub use engine::{
    compute_monthly_payment, generate_schedule, get_monthly_details, payment_for_rate, schedule_for,
    solve_principal,
};
pub use schedule::{calculate_totals, Schedule, ScheduleEntry, Totals};
