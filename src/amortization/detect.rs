//! Repayment convention classification from observed payment histories

use crate::loan::RepaymentConvention;

/// Coefficient of variation below which payments count as level
pub const LEVEL_PAYMENT_CV_THRESHOLD: f64 = 0.05;

/// Mean month-over-month change below which payments count as declining
pub const DECLINING_TREND_THRESHOLD: f64 = -0.001;

/// Classify a payment history by its coefficient of variation.
///
/// Roughly constant payments (CV < 5%) indicate equal payment; anything
/// more variable is taken as equal principal. Fewer than two samples, or a
/// history whose mean is not positive, defaults to equal payment.
pub fn detect_convention(payment_history: &[f64]) -> RepaymentConvention {
    if payment_history.len() < 2 {
        return RepaymentConvention::EqualPayment;
    }

    let n = payment_history.len() as f64;
    let mean = payment_history.iter().sum::<f64>() / n;
    if !(mean > 0.0) {
        return RepaymentConvention::EqualPayment;
    }

    // Population variance
    let variance = payment_history.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean;

    if cv < LEVEL_PAYMENT_CV_THRESHOLD {
        RepaymentConvention::EqualPayment
    } else {
        RepaymentConvention::EqualPrincipal
    }
}

/// Classify a payment history by the direction of its average change.
///
/// A consistently declining sequence indicates equal principal.
pub fn detect_convention_by_trend(payment_history: &[f64]) -> RepaymentConvention {
    if payment_history.len() < 2 {
        return RepaymentConvention::EqualPayment;
    }

    let changes: Vec<f64> = payment_history.windows(2).map(|w| w[1] - w[0]).collect();
    let avg_change = changes.iter().sum::<f64>() / changes.len() as f64;

    if avg_change < DECLINING_TREND_THRESHOLD {
        RepaymentConvention::EqualPrincipal
    } else {
        RepaymentConvention::EqualPayment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::generate_schedule;
    use chrono::NaiveDate;

    #[test]
    fn test_short_history_defaults_to_equal_payment() {
        assert_eq!(detect_convention(&[]), RepaymentConvention::EqualPayment);
        assert_eq!(detect_convention(&[100.0]), RepaymentConvention::EqualPayment);
        assert_eq!(detect_convention_by_trend(&[]), RepaymentConvention::EqualPayment);
        assert_eq!(detect_convention_by_trend(&[100.0]), RepaymentConvention::EqualPayment);
    }

    #[test]
    fn test_level_payments() {
        let history = [1000.0, 1000.0, 1000.5, 999.5];
        assert_eq!(detect_convention(&history), RepaymentConvention::EqualPayment);
        assert_eq!(detect_convention_by_trend(&[1000.0, 1000.0, 1000.0]), RepaymentConvention::EqualPayment);
    }

    #[test]
    fn test_strongly_declining_payments() {
        let history = [1000.0, 900.0, 800.0, 700.0];
        assert_eq!(detect_convention(&history), RepaymentConvention::EqualPrincipal);
        assert_eq!(detect_convention_by_trend(&history), RepaymentConvention::EqualPrincipal);
    }

    #[test]
    fn test_heuristics_can_disagree() {
        // Small steady decline: level by CV, declining by trend
        let history = [1000.0, 999.0, 998.0, 997.0];
        assert_eq!(detect_convention(&history), RepaymentConvention::EqualPayment);
        assert_eq!(detect_convention_by_trend(&history), RepaymentConvention::EqualPrincipal);
    }

    #[test]
    fn test_degenerate_mean() {
        assert_eq!(detect_convention(&[0.0, 0.0, 0.0]), RepaymentConvention::EqualPayment);
    }

    #[test]
    fn test_full_equal_principal_schedule() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let schedule = generate_schedule(120_000.0, 12.0, 60, start, RepaymentConvention::EqualPrincipal).unwrap();
        let history: Vec<f64> = schedule.iter().map(|e| e.payment_amount).collect();
        assert_eq!(detect_convention(&history), RepaymentConvention::EqualPrincipal);
        assert_eq!(detect_convention_by_trend(&history), RepaymentConvention::EqualPrincipal);
    }
}
