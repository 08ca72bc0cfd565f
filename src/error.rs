//! Error types for loan calculations

use thiserror::Error;

/// Errors raised by the amortization and rate inversion engines
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unsupported repayment convention: {0}")]
    UnsupportedConvention(String),

    #[error("Month {target_month} is out of range (1..={term_months})")]
    OutOfRange { target_month: u32, term_months: u32 },

    #[error("Payment {payment:.2} does not cover interest {interest:.2} in month {month}; the loan cannot be repaid")]
    UnpayableLoan {
        month: u32,
        payment: f64,
        interest: f64,
    },

    #[error("Repayment does not finish within {max_months} months")]
    ExcessiveTerm { max_months: u32 },

    #[error("Analysis failed: {source}")]
    AnalysisFailed {
        #[source]
        source: Box<LoanError>,
    },
}

impl LoanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an engine failure raised during combined analysis
    pub fn analysis_failed(cause: LoanError) -> Self {
        LoanError::AnalysisFailed {
            source: Box::new(cause),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_analysis_failed_keeps_cause() {
        let err = LoanError::analysis_failed(LoanError::ExcessiveTerm { max_months: 600 });
        assert!(err.to_string().contains("600 months"));
        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().starts_with("Repayment does not finish"));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = LoanError::invalid("principal", "must be positive");
        assert_eq!(err.to_string(), "Invalid input: principal - must be positive");
    }
}
