//! Forward amortization: payments and repayment schedules

use chrono::NaiveDate;

use super::schedule::{Schedule, ScheduleEntry};
use crate::calendar::add_months;
use crate::error::{LoanError, Result};
use crate::loan::{monthly_rate, round_currency, validate_terms, LoanTerms, RepaymentConvention};

/// Payment for a given monthly rate, without input validation.
///
/// Shared by the forward engine and the rate solver. For equal principal
/// loans this is the first (largest) monthly payment.
pub fn payment_for_rate(
    principal: f64,
    monthly_rate: f64,
    term_months: u32,
    convention: RepaymentConvention,
) -> f64 {
    let n = term_months as f64;
    match convention {
        RepaymentConvention::EqualPayment => {
            if monthly_rate == 0.0 {
                return principal / n;
            }
            let growth = (1.0 + monthly_rate).powf(n);
            principal * monthly_rate * growth / (growth - 1.0)
        }
        RepaymentConvention::EqualPrincipal => principal / n + principal * monthly_rate,
    }
}

/// Monthly payment for a loan.
///
/// Equal payment loans return the level payment; equal principal loans
/// return the first month's payment (payments decline afterwards).
pub fn compute_monthly_payment(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    convention: RepaymentConvention,
) -> Result<f64> {
    validate_terms(principal, annual_rate_percent, term_months)?;
    Ok(payment_for_rate(principal, monthly_rate(annual_rate_percent), term_months, convention))
}

/// Generate the full repayment schedule.
///
/// Interest accrues on the unrounded running balance; amounts are rounded
/// only when each entry is emitted. The final entry settles the rounding
/// remainder so that principal components sum to the rounded principal and
/// the remaining balance ends at exactly zero.
pub fn generate_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    start_date: NaiveDate,
    convention: RepaymentConvention,
) -> Result<Schedule> {
    validate_terms(principal, annual_rate_percent, term_months)?;

    let rate = monthly_rate(annual_rate_percent);
    let level_payment = payment_for_rate(principal, rate, term_months, convention);
    let level_principal = principal / term_months as f64;

    let mut schedule = Schedule::with_capacity(term_months);
    let mut balance = principal;
    let mut emitted_principal = 0.0;

    for month in 1..=term_months {
        let payment_date = add_months(start_date, month - 1)?;
        let interest = balance * rate;

        let (payment, principal_part) = match convention {
            RepaymentConvention::EqualPayment => (level_payment, level_payment - interest),
            RepaymentConvention::EqualPrincipal => (level_principal + interest, level_principal),
        };

        balance -= principal_part;

        let entry = if month == term_months {
            balance = 0.0;
            let principal_component = round_currency(round_currency(principal) - emitted_principal);
            let interest_component = round_currency(interest);
            ScheduleEntry {
                month_index: month,
                payment_date,
                payment_amount: round_currency(principal_component + interest_component),
                principal_component,
                interest_component,
                remaining_balance: balance,
            }
        } else {
            let principal_component = round_currency(principal_part);
            emitted_principal += principal_component;
            ScheduleEntry {
                month_index: month,
                payment_date,
                payment_amount: round_currency(payment),
                principal_component,
                interest_component: round_currency(interest),
                remaining_balance: round_currency(balance).max(0.0),
            }
        };

        schedule.add_entry(entry);
    }

    log::debug!(
        "Generated {} month {} schedule for principal {:.2} at {}%",
        term_months,
        convention,
        principal,
        annual_rate_percent
    );

    Ok(schedule)
}

/// Schedule for a [`LoanTerms`] value
pub fn schedule_for(terms: &LoanTerms) -> Result<Schedule> {
    generate_schedule(
        terms.principal,
        terms.annual_rate_percent,
        terms.term_months,
        terms.start_date,
        terms.convention,
    )
}

/// Schedule entry for a single 1-indexed month.
///
/// Recomputes the full schedule.
pub fn get_monthly_details(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    target_month: u32,
    start_date: NaiveDate,
    convention: RepaymentConvention,
) -> Result<ScheduleEntry> {
    if target_month < 1 || target_month > term_months {
        return Err(LoanError::OutOfRange {
            target_month,
            term_months,
        });
    }

    let schedule = generate_schedule(principal, annual_rate_percent, term_months, start_date, convention)?;
    schedule
        .month(target_month)
        .cloned()
        .ok_or(LoanError::OutOfRange {
            target_month,
            term_months,
        })
}

/// Principal implied by a level monthly payment at a known rate and term
pub fn solve_principal(monthly_payment: f64, annual_rate_percent: f64, term_months: u32) -> Result<f64> {
    if !(monthly_payment > 0.0) {
        return Err(LoanError::invalid(
            "monthly_payment",
            format!("must be positive, got {}", monthly_payment),
        ));
    }
    // Any positive principal passes; only the rate and term are checked here
    validate_terms(1.0, annual_rate_percent, term_months)?;

    let factor = payment_for_rate(1.0, monthly_rate(annual_rate_percent), term_months, RepaymentConvention::EqualPayment);
    Ok(monthly_payment / factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn test_equal_payment_reference_loan() {
        let payment = compute_monthly_payment(3_000_000.0, 3.0, 360, RepaymentConvention::EqualPayment).unwrap();
        assert_eq!(round_currency(payment), 12648.12);

        let schedule = generate_schedule(3_000_000.0, 3.0, 360, start(), RepaymentConvention::EqualPayment).unwrap();
        assert_eq!(schedule.len(), 360);

        let first = schedule.first().unwrap();
        assert_eq!(first.month_index, 1);
        assert_eq!(first.payment_date, start());
        assert_eq!(first.payment_amount, 12648.12);
        assert_eq!(first.interest_component, 7500.0);
        assert_eq!(first.principal_component, 5148.12);
        assert_eq!(first.remaining_balance, 2_994_851.88);

        let last = schedule.last().unwrap();
        assert_eq!(last.month_index, 360);
        assert_eq!(last.payment_date, NaiveDate::from_ymd_opt(2054, 3, 1).unwrap());
        assert_eq!(last.remaining_balance, 0.0);
    }

    #[test]
    fn test_zero_rate_equal_payment() {
        let payment = compute_monthly_payment(1200.0, 0.0, 12, RepaymentConvention::EqualPayment).unwrap();
        assert_eq!(payment, 100.0);

        let schedule = generate_schedule(1200.0, 0.0, 12, start(), RepaymentConvention::EqualPayment).unwrap();
        assert!(schedule.iter().all(|e| e.interest_component == 0.0 && e.payment_amount == 100.0));
        assert_eq!(schedule.totals().total_interest, 0.0);
        assert_eq!(schedule.totals().total_payment, 1200.0);
    }

    #[test]
    fn test_equal_principal_first_payment() {
        let payment = compute_monthly_payment(3_000_000.0, 3.0, 360, RepaymentConvention::EqualPrincipal).unwrap();
        assert_abs_diff_eq!(payment, 8333.333333 + 7500.0, epsilon = 1e-4);
    }

    #[test]
    fn test_equal_principal_schedule_declines() {
        let schedule = generate_schedule(120_000.0, 6.0, 24, start(), RepaymentConvention::EqualPrincipal).unwrap();
        assert_eq!(schedule.len(), 24);

        let first = schedule.first().unwrap();
        assert_eq!(first.principal_component, 5000.0);
        assert_eq!(first.interest_component, 600.0);
        assert_eq!(first.payment_amount, 5600.0);

        for pair in schedule.entries.windows(2) {
            assert!(pair[1].payment_amount < pair[0].payment_amount);
            assert_eq!(pair[1].principal_component, 5000.0);
        }
        assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_principal_components_sum_to_principal() {
        let cases = [
            (3_000_000.0, 3.0, 360, RepaymentConvention::EqualPayment),
            (3_000_000.0, 3.0, 360, RepaymentConvention::EqualPrincipal),
            (123_456.78, 4.25, 300, RepaymentConvention::EqualPayment),
            (123_456.78, 4.25, 300, RepaymentConvention::EqualPrincipal),
            (100_000.0, 0.0, 7, RepaymentConvention::EqualPayment),
            (1000.0, 12.0, 13, RepaymentConvention::EqualPrincipal),
            (5000.0, 9.9, 1, RepaymentConvention::EqualPayment),
        ];

        for (principal, rate, months, convention) in cases {
            let schedule = generate_schedule(principal, rate, months, start(), convention).unwrap();
            let paid: f64 = schedule.iter().map(|e| e.principal_component).sum();
            assert_abs_diff_eq!(paid, principal, epsilon = 0.01);
        }
    }

    #[test]
    fn test_balance_monotonic_and_ends_at_zero() {
        for months in [1u32, 2, 12, 59, 360] {
            let schedule = generate_schedule(250_000.0, 5.0, months, start(), RepaymentConvention::EqualPayment).unwrap();
            assert_eq!(schedule.len(), months as usize);
            for pair in schedule.entries.windows(2) {
                assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
                assert_eq!(pair[1].month_index, pair[0].month_index + 1);
            }
            assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
        }
    }

    #[test]
    fn test_payment_round_trip_from_first_entry() {
        for convention in [RepaymentConvention::EqualPayment, RepaymentConvention::EqualPrincipal] {
            let payment = compute_monthly_payment(250_000.0, 4.5, 180, convention).unwrap();
            let schedule = generate_schedule(250_000.0, 4.5, 180, start(), convention).unwrap();
            let first = schedule.first().unwrap();
            assert_abs_diff_eq!(first.payment_amount, payment, epsilon = 0.005);
            assert_abs_diff_eq!(first.principal_component + first.interest_component, payment, epsilon = 0.01);
        }
    }

    #[test]
    fn test_payment_dates_roll_over_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let schedule = generate_schedule(3000.0, 1.0, 3, jan31, RepaymentConvention::EqualPayment).unwrap();
        let dates: Vec<_> = schedule.iter().map(|e| e.payment_date).collect();
        assert_eq!(
            dates,
            vec![
                jan31,
                NaiveDate::from_ymd_opt(2023, 3, 3).unwrap(),
                NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let cases = [(0.0, 3.0, 12), (-100.0, 3.0, 12), (1000.0, -1.0, 12), (1000.0, 3.0, 0)];
        for (principal, rate, months) in cases {
            for convention in [RepaymentConvention::EqualPayment, RepaymentConvention::EqualPrincipal] {
                let err = compute_monthly_payment(principal, rate, months, convention).unwrap_err();
                assert!(matches!(err, LoanError::InvalidInput { .. }));
                let err = generate_schedule(principal, rate, months, start(), convention).unwrap_err();
                assert!(matches!(err, LoanError::InvalidInput { .. }));
            }
        }
    }

    #[test]
    fn test_monthly_details() {
        let entry = get_monthly_details(3_000_000.0, 3.0, 360, 1, start(), RepaymentConvention::EqualPayment).unwrap();
        assert_eq!(entry.month_index, 1);
        assert_eq!(entry.interest_component, 7500.0);

        let entry = get_monthly_details(3_000_000.0, 3.0, 360, 13, start(), RepaymentConvention::EqualPayment).unwrap();
        assert_eq!(entry.month_index, 13);
        assert_eq!(entry.payment_date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_monthly_details_out_of_range() {
        for target in [0, 361] {
            let err = get_monthly_details(3_000_000.0, 3.0, 360, target, start(), RepaymentConvention::EqualPayment)
                .unwrap_err();
            assert!(matches!(
                err,
                LoanError::OutOfRange { target_month, term_months: 360 } if target_month == target
            ));
        }
    }

    #[test]
    fn test_solve_principal() {
        let payment = compute_monthly_payment(200_000.0, 4.0, 240, RepaymentConvention::EqualPayment).unwrap();
        assert_abs_diff_eq!(solve_principal(payment, 4.0, 240).unwrap(), 200_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solve_principal(500.0, 0.0, 24).unwrap(), 12_000.0, epsilon = 1e-9);

        assert!(matches!(solve_principal(0.0, 4.0, 240), Err(LoanError::InvalidInput { .. })));
        assert!(matches!(solve_principal(500.0, -4.0, 240), Err(LoanError::InvalidInput { .. })));
        assert!(matches!(solve_principal(500.0, 4.0, 0), Err(LoanError::InvalidInput { .. })));
    }

    #[test]
    fn test_schedule_for_terms() {
        let terms = LoanTerms::new(10_000.0, 5.0, 12, start(), RepaymentConvention::EqualPrincipal);
        let schedule = schedule_for(&terms).unwrap();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.first().unwrap().principal_component, 833.33);
    }
}
