use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// what a prepayment does to the rest of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PrepaymentMode {
    /// keep the regular payment, finish the loan early
    #[default]
    ReduceTenure,
    /// recompute the regular payment over the remaining original term
    ReduceEmi,
}

/// how often a dated prepayment repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PrepaymentFrequency {
    /// only in the calendar month of its date
    #[default]
    OneTime,
    /// every period from its date's month onward
    Monthly,
    /// the same calendar month each year, from its date's year onward
    Annually,
}

/// dated extra principal payment for the event-driven engine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prepayment {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub frequency: PrepaymentFrequency,
    #[serde(default)]
    pub mode: PrepaymentMode,
}

impl Prepayment {
    pub fn one_time(date: NaiveDate, amount: Money, mode: PrepaymentMode) -> Self {
        Self {
            date,
            amount,
            frequency: PrepaymentFrequency::OneTime,
            mode,
        }
    }

    pub fn monthly(from: NaiveDate, amount: Money, mode: PrepaymentMode) -> Self {
        Self {
            date: from,
            amount,
            frequency: PrepaymentFrequency::Monthly,
            mode,
        }
    }

    pub fn annually(from: NaiveDate, amount: Money, mode: PrepaymentMode) -> Self {
        Self {
            date: from,
            amount,
            frequency: PrepaymentFrequency::Annually,
            mode,
        }
    }

    /// whether this prepayment lands in the period dated `period_date` (matched by calendar month)
    pub fn applies_in(&self, period_date: NaiveDate) -> bool {
        let start = month_index(self.date);
        let current = month_index(period_date);
        match self.frequency {
            PrepaymentFrequency::OneTime => start == current,
            PrepaymentFrequency::Monthly => current >= start,
            PrepaymentFrequency::Annually => {
                current >= start && period_date.month() == self.date.month()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CalculatorError::invalid_input(
                "prepayment.amount",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// new annual rate effective from a date forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateChange {
    pub effective_date: NaiveDate,
    pub annual_rate: Rate,
}

impl RateChange {
    pub fn new(effective_date: NaiveDate, annual_rate: Rate) -> Self {
        Self {
            effective_date,
            annual_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.annual_rate.is_negative() {
            return Err(CalculatorError::invalid_input(
                "rate_change.annual_rate",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// when a period-keyed extra payment applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraPaymentKind {
    /// single lump sum in one period
    LumpSum { period: u32 },
    /// every period from `start_period`, optionally through `end_period`
    Recurring {
        start_period: u32,
        end_period: Option<u32>,
    },
}

/// extra principal keyed by period number, used by the base engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub amount: Money,
    pub kind: ExtraPaymentKind,
}

impl ExtraPayment {
    pub fn lump_sum(period: u32, amount: Money) -> Self {
        Self {
            amount,
            kind: ExtraPaymentKind::LumpSum { period },
        }
    }

    pub fn monthly_from(start_period: u32, amount: Money) -> Self {
        Self {
            amount,
            kind: ExtraPaymentKind::Recurring {
                start_period,
                end_period: None,
            },
        }
    }

    pub fn monthly_between(start_period: u32, end_period: u32, amount: Money) -> Self {
        Self {
            amount,
            kind: ExtraPaymentKind::Recurring {
                start_period,
                end_period: Some(end_period),
            },
        }
    }

    /// amount this extra contributes in `period` (1-based)
    pub fn amount_for_period(&self, period: u32) -> Money {
        let applies = match self.kind {
            ExtraPaymentKind::LumpSum { period: p } => p == period,
            ExtraPaymentKind::Recurring {
                start_period,
                end_period,
            } => period >= start_period && end_period.map_or(true, |end| period <= end),
        };
        if applies {
            self.amount
        } else {
            Money::ZERO
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(CalculatorError::invalid_input(
                "extra_payment.amount",
                "must be greater than zero",
            ));
        }
        match self.kind {
            ExtraPaymentKind::LumpSum { period: 0 }
            | ExtraPaymentKind::Recurring { start_period: 0, .. } => Err(
                CalculatorError::invalid_input("extra_payment.period", "periods are 1-based"),
            ),
            ExtraPaymentKind::Recurring {
                start_period,
                end_period: Some(end),
            } if end < start_period => Err(CalculatorError::invalid_input(
                "extra_payment.end_period",
                "must not precede start_period",
            )),
            _ => Ok(()),
        }
    }
}

/// sum of all extras applicable in `period`
pub fn extras_for_period(extras: &[ExtraPayment], period: u32) -> Money {
    extras.iter().map(|e| e.amount_for_period(period)).sum()
}

/// purpose of a VA loan, drives the funding fee table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VaLoanPurpose {
    #[default]
    Purchase,
    CashOutRefinance,
    /// interest rate reduction refinance loan
    Irrrl,
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
