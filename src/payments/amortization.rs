use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleLimits;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::interest::{calculate_monthly_payment, validate_loan_inputs};
use crate::types::{extras_for_period, ExtraPayment};

/// one period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month index
    pub period: u32,
    pub date: Option<NaiveDate>,
    pub annual_rate: Rate,
    pub opening_balance: Money,
    /// regular installment applied this period
    pub scheduled_payment: Money,
    pub extra_payment: Money,
    pub total_payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// full schedule plus totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// regular installment at the start of the schedule
    pub regular_payment: Money,
    /// number of periods until the balance reached zero
    pub term_months: u32,
    pub total_interest: Money,
    pub total_payment: Money,
    pub rows: Vec<AmortizationRow>,
}

/// 12-period aggregate for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    /// 1-based year of the loan
    pub year: u32,
    pub principal: Money,
    pub interest: Money,
    pub total_payment: Money,
    pub closing_balance: Money,
}

impl PaymentResult {
    pub(crate) fn from_rows(regular_payment: Money, rows: Vec<AmortizationRow>) -> Self {
        let total_interest = rows.iter().map(|r| r.interest).sum();
        let total_payment = rows.iter().map(|r| r.total_payment).sum();

        Self {
            regular_payment,
            term_months: rows.len() as u32,
            total_interest,
            total_payment,
            rows,
        }
    }

    pub fn total_principal(&self) -> Money {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn final_payment_date(&self) -> Option<NaiveDate> {
        self.rows.last().and_then(|r| r.date)
    }

    pub fn get_row(&self, period: u32) -> Option<&AmortizationRow> {
        period
            .checked_sub(1)
            .and_then(|index| self.rows.get(index as usize))
    }

    /// fold rows into loan years
    pub fn yearly_summary(&self) -> Vec<YearSummary> {
        self.rows
            .chunks(12)
            .zip(1..)
            .map(|(block, year)| YearSummary {
                year,
                principal: block.iter().map(|r| r.principal).sum(),
                interest: block.iter().map(|r| r.interest).sum(),
                total_payment: block.iter().map(|r| r.total_payment).sum(),
                closing_balance: block.last().map_or(Money::ZERO, |r| r.closing_balance),
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// balance and running totals threaded from one period into the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ledger {
    pub balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// inputs for settling one period
#[derive(Debug, Clone, Copy)]
pub(crate) struct PeriodTerms {
    pub period: u32,
    pub date: Option<NaiveDate>,
    pub annual_rate: Rate,
    pub regular_payment: Money,
    pub extra_payment: Money,
    /// last period of the contractual schedule, where rounding residue is absorbed
    pub scheduled_term: u32,
}

impl Ledger {
    pub fn open(principal: Money) -> Self {
        Self {
            balance: principal.round_cents(),
            cumulative_interest: Money::ZERO,
            cumulative_principal: Money::ZERO,
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.balance.is_positive()
    }

    /// settle one period: interest on the opening balance, then the regular
    /// installment, then extra principal, capped so the loan is never overpaid
    pub fn settle(&self, terms: PeriodTerms, limits: &ScheduleLimits) -> Result<(Ledger, AmortizationRow)> {
        let opening = self.balance;
        let interest = opening.monthly_interest(terms.annual_rate);
        let due = opening + interest;

        let mut scheduled = terms.regular_payment.round_cents().min(due);
        let offered_extra = terms.extra_payment.round_cents();
        if scheduled + offered_extra < interest {
            return Err(CalculatorError::NegativeAmortization {
                period: terms.period,
                payment: scheduled,
                interest,
            });
        }

        // may exceed the opening balance when this period's extra covers an interest shortfall
        let after_regular = opening - (scheduled - interest);
        let extra = offered_extra.min(after_regular).max(Money::ZERO);
        let mut closing = (after_regular - extra).round_cents().max(Money::ZERO);

        if closing.is_positive()
            && (closing <= limits.balance_epsilon
                || (terms.period >= terms.scheduled_term && closing < limits.rounding_residual))
        {
            scheduled += closing;
            closing = Money::ZERO;
        }

        let total_payment = scheduled + extra;
        let principal = total_payment - interest;
        let next = Ledger {
            balance: closing,
            cumulative_interest: self.cumulative_interest + interest,
            cumulative_principal: self.cumulative_principal + principal,
        };

        let row = AmortizationRow {
            period: terms.period,
            date: terms.date,
            annual_rate: terms.annual_rate,
            opening_balance: opening,
            scheduled_payment: scheduled,
            extra_payment: extra,
            total_payment,
            principal,
            interest,
            closing_balance: closing,
            cumulative_interest: next.cumulative_interest,
            cumulative_principal: next.cumulative_principal,
        };

        Ok((next, row))
    }
}

/// Fixed-rate schedule with optional period-keyed extras.
///
/// The regular payment is the annuity payment rounded to cents; each period
/// pays interest on the opening balance first, then principal. Extras reduce
/// tenure. Runs at most `term_months + limits.extra_periods` periods and fails
/// with `ScheduleDidNotTerminate` rather than truncating.
pub fn compute_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    extras: &[ExtraPayment],
    limits: &ScheduleLimits,
) -> Result<PaymentResult> {
    validate_loan_inputs(principal, annual_rate, term_months)?;
    for extra in extras {
        extra.validate()?;
    }

    let regular_payment = calculate_monthly_payment(principal, annual_rate, term_months)?;
    let max_periods = term_months.saturating_add(limits.extra_periods);

    let mut ledger = Ledger::open(principal);
    let mut rows = Vec::with_capacity(term_months as usize);

    for period in 1..=max_periods {
        let terms = PeriodTerms {
            period,
            date: None,
            annual_rate,
            regular_payment,
            extra_payment: extras_for_period(extras, period),
            scheduled_term: term_months,
        };
        let (next, row) = ledger.settle(terms, limits)?;
        rows.push(row);
        ledger = next;

        if ledger.is_closed() {
            return Ok(PaymentResult::from_rows(regular_payment, rows));
        }
    }

    log::warn!(
        "schedule for principal {} hit its {} period cap with {} outstanding",
        principal,
        max_periods,
        ledger.balance
    );
    Err(CalculatorError::ScheduleDidNotTerminate {
        periods: max_periods,
        remaining_balance: ledger.balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits() -> ScheduleLimits {
        ScheduleLimits::default()
    }

    #[test]
    fn test_reference_schedule() {
        let result = compute_schedule(
            Money::from_major(1_000_000),
            Rate::from_percent(dec!(7.5)),
            240,
            &[],
            &limits(),
        )
        .unwrap();

        assert_eq!(result.regular_payment, Money::from_decimal(dec!(8055.93)));
        assert_eq!(result.term_months, 240);
        assert_eq!(result.rows.last().unwrap().closing_balance, Money::ZERO);

        // first period: 1,000,000 * 0.075 / 12 = 6250
        let first = &result.rows[0];
        assert_eq!(first.interest, Money::from_major(6_250));
        assert_eq!(first.principal, Money::from_decimal(dec!(1805.93)));
        assert_eq!(first.closing_balance, Money::from_decimal(dec!(998194.07)));
    }

    #[test]
    fn test_zero_rate_schedule() {
        let result = compute_schedule(Money::from_major(120_000), Rate::ZERO, 12, &[], &limits()).unwrap();

        assert_eq!(result.regular_payment, Money::from_major(10_000));
        assert_eq!(result.total_interest, Money::ZERO);
        assert_eq!(result.rows.len(), 12);
        assert!(result.rows.iter().all(|r| r.principal == Money::from_major(10_000)));
    }

    #[test]
    fn test_zero_rate_with_uneven_division() {
        let principal = Money::from_major(100_000);
        let result = compute_schedule(principal, Rate::ZERO, 3, &[], &limits()).unwrap();

        // 33333.33 x 2 then the final period absorbs the remaining cent
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[2].principal, Money::from_decimal(dec!(33333.34)));
        assert_eq!(result.total_principal(), principal);
    }

    #[test]
    fn test_final_payment_capped() {
        // 1000 at 0% over 3 months with a 900 lump in month 2
        let result = compute_schedule(
            Money::from_major(1_000),
            Rate::ZERO,
            3,
            &[ExtraPayment::lump_sum(2, Money::from_major(900))],
            &limits(),
        )
        .unwrap();

        assert_eq!(result.rows.len(), 2);
        let last = &result.rows[1];
        assert_eq!(last.opening_balance, Money::from_decimal(dec!(666.67)));
        assert_eq!(last.total_payment, Money::from_decimal(dec!(666.67)));
        assert_eq!(last.scheduled_payment, Money::from_decimal(dec!(333.33)));
        assert_eq!(last.extra_payment, Money::from_decimal(dec!(333.34)));
        assert_eq!(last.closing_balance, Money::ZERO);
    }

    #[test]
    fn test_monthly_extra_shortens_term() {
        let principal = Money::from_major(200_000);
        let rate = Rate::from_percent(dec!(6.5));
        let base = compute_schedule(principal, rate, 360, &[], &limits()).unwrap();
        let extra = compute_schedule(
            principal,
            rate,
            360,
            &[ExtraPayment::monthly_from(1, Money::from_major(200))],
            &limits(),
        )
        .unwrap();

        assert!(extra.term_months < base.term_months);
        assert!(extra.total_interest < base.total_interest);
        assert_eq!(extra.regular_payment, base.regular_payment);
    }

    #[test]
    fn test_row_invariants() {
        let result = compute_schedule(
            Money::from_decimal(dec!(54321.99)),
            Rate::from_percent(dec!(11.25)),
            84,
            &[ExtraPayment::lump_sum(10, Money::from_major(5_000))],
            &limits(),
        )
        .unwrap();

        let mut previous = Money::from_decimal(dec!(54321.99));
        for row in &result.rows {
            assert_eq!(row.principal + row.interest, row.total_payment);
            assert_eq!(row.opening_balance - row.principal, row.closing_balance);
            assert!(row.closing_balance <= previous);
            previous = row.closing_balance;
        }
        assert_eq!(previous, Money::ZERO);
        assert_eq!(result.rows.last().unwrap().cumulative_interest, result.total_interest);
    }

    #[test]
    fn test_yearly_summary() {
        let result = compute_schedule(Money::from_major(24_000), Rate::ZERO, 30, &[], &limits()).unwrap();
        let years = result.yearly_summary();

        assert_eq!(years.len(), 3);
        assert_eq!(years[0].principal, Money::from_major(9_600));
        assert_eq!(years[1].closing_balance, Money::from_major(4_800));
        assert_eq!(years[2].principal, Money::from_major(4_800));
        assert_eq!(years[2].closing_balance, Money::ZERO);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let rate = Rate::from_percentage(5);
        assert!(matches!(
            compute_schedule(Money::ZERO, rate, 12, &[], &limits()),
            Err(CalculatorError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_schedule(Money::from_major(1_000), rate, 0, &[], &limits()),
            Err(CalculatorError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_schedule(
                Money::from_major(1_000),
                rate,
                12,
                &[ExtraPayment::lump_sum(1, Money::from_major(-10))],
                &limits()
            ),
            Err(CalculatorError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_period_cap_reported() {
        let tight = ScheduleLimits {
            extra_periods: 0,
            max_periods: 3,
            balance_epsilon: Money::ZERO,
            rounding_residual: Money::ZERO,
        };
        // 1000 at 0% over 3 months is 333.33/month; without residual absorption
        // a cent remains after the third period
        let err = compute_schedule(Money::from_major(1_000), Rate::ZERO, 3, &[], &tight).unwrap_err();

        assert_eq!(
            err,
            CalculatorError::ScheduleDidNotTerminate {
                periods: 3,
                remaining_balance: Money::CENT,
            }
        );
    }
}
