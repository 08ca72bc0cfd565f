//! Schedule output structures for amortization

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::loan::round_currency;

/// A single monthly row of a repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Payment number (1-indexed)
    pub month_index: u32,
    pub payment_date: NaiveDate,

    // Monetary fields, rounded to 2 decimals
    pub payment_amount: f64,
    pub principal_component: f64,
    pub interest_component: f64,
    pub remaining_balance: f64,
}

/// Complete repayment schedule, ordered by month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn with_capacity(term_months: u32) -> Self {
        Self {
            entries: Vec::with_capacity(term_months as usize),
        }
    }

    /// Add a schedule row
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a 1-indexed month, if present
    pub fn month(&self, month_index: u32) -> Option<&ScheduleEntry> {
        let idx = month_index.checked_sub(1)? as usize;
        self.entries.get(idx)
    }

    pub fn first(&self) -> Option<&ScheduleEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    /// Aggregate payment and interest totals
    pub fn totals(&self) -> Totals {
        calculate_totals(self)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Aggregate totals over a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_payment: f64,
    pub total_interest: f64,
}

/// Sum payments and interest across all entries, rounded to 2 decimals
pub fn calculate_totals(schedule: &Schedule) -> Totals {
    let total_payment: f64 = schedule.iter().map(|e| e.payment_amount).sum();
    let total_interest: f64 = schedule.iter().map(|e| e.interest_component).sum();

    Totals {
        total_payment: round_currency(total_payment),
        total_interest: round_currency(total_interest),
    }
}
