//! Load observed loans from CSV for batch analysis

use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use serde::Deserialize;

use super::ConventionSelection;
use crate::error::{LoanError, Result};
use crate::inversion::AnalysisParams;

/// Raw CSV row
///
/// Columns: `loan_id,start_date,monthly_payment,principal,remaining_balance,term_months,convention`.
/// Empty cells are treated as missing values.
#[derive(Debug, Deserialize)]
struct CsvRow {
    loan_id: String,
    start_date: Option<NaiveDate>,
    monthly_payment: Option<f64>,
    principal: Option<f64>,
    remaining_balance: Option<f64>,
    term_months: Option<u32>,
    #[serde(default)]
    convention: String,
}

/// An observed loan awaiting analysis
#[derive(Debug, Clone)]
pub struct LoanRecord {
    pub loan_id: String,
    pub params: AnalysisParams,
    pub convention: ConventionSelection,
}

impl CsvRow {
    fn to_record(self) -> Result<LoanRecord> {
        let convention = self.convention.parse::<ConventionSelection>()?;

        Ok(LoanRecord {
            loan_id: self.loan_id,
            params: AnalysisParams {
                start_date: self.start_date,
                monthly_payment: self.monthly_payment,
                principal: self.principal,
                remaining_balance: self.remaining_balance,
                term_months: self.term_months,
            },
            convention,
        })
    }
}

fn csv_error(err: csv::Error) -> LoanError {
    LoanError::invalid("csv", err.to_string())
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>> {
    let reader = Reader::from_path(path).map_err(csv_error)?;
    read_records(reader)
}

/// Load loans from any reader (e.g., string buffer, stdin)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result.map_err(csv_error)?;
        loans.push(row.to_record()?);
    }

    log::debug!("Loaded {} loan records", loans.len());
    Ok(loans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::RepaymentConvention;

    const SAMPLE: &str = "\
loan_id,start_date,monthly_payment,principal,remaining_balance,term_months,convention
A-1,2020-04-01,12648.12,3000000,,360,equal_payment
B-2,2022-01-15,850.5,,45000,,auto
C-3,2021-07-31,1200,100000,,120,
";

    #[test]
    fn test_load_loans_from_reader() {
        let loans = load_loans_from_reader(SAMPLE.as_bytes()).expect("Failed to load loans");
        assert_eq!(loans.len(), 3);

        let a = &loans[0];
        assert_eq!(a.loan_id, "A-1");
        assert_eq!(a.params.principal, Some(3_000_000.0));
        assert_eq!(a.params.remaining_balance, None);
        assert_eq!(a.params.term_months, Some(360));
        assert_eq!(a.convention, ConventionSelection::Known(RepaymentConvention::EqualPayment));

        let b = &loans[1];
        assert_eq!(b.params.principal, None);
        assert_eq!(b.params.remaining_balance, Some(45_000.0));
        assert_eq!(b.params.start_date, NaiveDate::from_ymd_opt(2022, 1, 15));
        assert_eq!(b.convention, ConventionSelection::Auto);

        assert_eq!(loans[2].convention, ConventionSelection::Auto);
    }

    #[test]
    fn test_unknown_convention_in_csv() {
        let data = "\
loan_id,start_date,monthly_payment,principal,remaining_balance,term_months,convention
X,2020-01-01,100,1000,,12,bullet
";
        let err = load_loans_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoanError::UnsupportedConvention(_)));
    }
}
