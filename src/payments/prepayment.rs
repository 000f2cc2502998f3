use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ScheduleLimits;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::events::EventTimeline;
use crate::interest::{
    annuity_payment, calculate_loan_term, calculate_monthly_payment, validate_principal_and_rate,
};
use crate::types::{Prepayment, RateChange};

use super::amortization::{Ledger, PaymentResult, PeriodTerms};

/// how the regular installment is fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// solve for the payment that amortizes over `term_months`
    FixedTerm { term_months: u32 },
    /// solve for the number of periods a fixed `payment` needs
    FixedPayment { payment: Money },
}

/// dated schedule request with optional prepayments and rate changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRequest {
    pub principal: Money,
    pub annual_rate: Rate,
    pub mode: PaymentMode,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub prepayments: Vec<Prepayment>,
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
}

impl AmortizationRequest {
    pub fn fixed_term(principal: Money, annual_rate: Rate, term_months: u32, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            mode: PaymentMode::FixedTerm { term_months },
            start_date,
            prepayments: Vec::new(),
            rate_changes: Vec::new(),
        }
    }

    pub fn fixed_payment(principal: Money, annual_rate: Rate, payment: Money, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            mode: PaymentMode::FixedPayment { payment },
            start_date,
            prepayments: Vec::new(),
            rate_changes: Vec::new(),
        }
    }

    pub fn with_prepayment(mut self, prepayment: Prepayment) -> Self {
        self.prepayments.push(prepayment);
        self
    }

    pub fn with_rate_change(mut self, change: RateChange) -> Self {
        self.rate_changes.push(change);
        self
    }

    /// regular payment and contractual term implied by the payment mode
    fn resolve_mode(&self) -> Result<(Money, u32)> {
        match self.mode {
            PaymentMode::FixedTerm { term_months } => {
                let payment = calculate_monthly_payment(self.principal, self.annual_rate, term_months)?;
                Ok((payment, term_months))
            }
            PaymentMode::FixedPayment { payment } => {
                let payment = payment.round_cents();
                let term = calculate_loan_term(self.principal, self.annual_rate, payment)?;
                Ok((payment, term))
            }
        }
    }
}

/// interest and tenure effect of a request's prepayments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentSavings {
    pub baseline_interest: Money,
    pub interest_with_prepayments: Money,
    pub interest_saved: Money,
    pub baseline_term_months: u32,
    pub term_months: u32,
    pub periods_saved: u32,
    pub baseline_payment: Money,
    /// regular installment in force at the end of the prepaid schedule
    pub final_regular_payment: Money,
}

/// regular payment and full schedule for a fixed term
pub fn solve_for_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    start_date: NaiveDate,
    limits: &ScheduleLimits,
) -> Result<PaymentResult> {
    let request = AmortizationRequest::fixed_term(principal, annual_rate, term_months, start_date);
    generate_payment_amortization(&request, limits)
}

/// term and full schedule for a fixed payment; fails with `PaymentTooLow`
/// when the payment does not cover the first period's interest
pub fn solve_for_term(
    principal: Money,
    annual_rate: Rate,
    payment: Money,
    start_date: NaiveDate,
    limits: &ScheduleLimits,
) -> Result<PaymentResult> {
    let request = AmortizationRequest::fixed_payment(principal, annual_rate, payment, start_date);
    generate_payment_amortization(&request, limits)
}

/// Event-driven schedule.
///
/// Each period resolves the rate in force on its date, charges interest on the
/// opening balance, applies the regular installment and then that month's
/// prepayments. A reduce-EMI prepayment re-amortizes the remaining balance over
/// what is left of the original term at the rate in force that period.
pub fn generate_payment_amortization(
    request: &AmortizationRequest,
    limits: &ScheduleLimits,
) -> Result<PaymentResult> {
    validate_principal_and_rate(request.principal, request.annual_rate)?;
    let (regular_payment, original_term) = request.resolve_mode()?;
    let timeline = EventTimeline::from_inputs(&request.prepayments, &request.rate_changes)?;

    let mut ledger = Ledger::open(request.principal);
    let mut payment = regular_payment;
    let mut current_rate = request.annual_rate;
    // without events the run behaves like the base engine; events may
    // stretch the term, but never below the contractual one
    let period_cap = if timeline.is_empty() {
        original_term.saturating_add(limits.extra_periods)
    } else {
        limits.max_periods.max(original_term)
    };
    let mut rows = Vec::with_capacity(original_term.min(period_cap) as usize);

    for period in 1..=period_cap {
        let date = period_date(request.start_date, period)?;
        let events = timeline.resolve(date, request.annual_rate);

        if events.annual_rate != current_rate {
            log::debug!(
                "rate change in period {} ({}): {} -> {}",
                period,
                date,
                current_rate,
                events.annual_rate
            );
            current_rate = events.annual_rate;
        }

        let terms = PeriodTerms {
            period,
            date: Some(date),
            annual_rate: current_rate,
            regular_payment: payment,
            extra_payment: events.extra_principal(),
            scheduled_term: original_term,
        };
        let (next, row) = ledger.settle(terms, limits)?;
        let prepaid = row.extra_payment.is_positive();
        rows.push(row);
        ledger = next;

        if ledger.is_closed() {
            return Ok(PaymentResult::from_rows(regular_payment, rows));
        }

        if prepaid && events.reduces_emi() {
            let remaining = original_term.saturating_sub(period).max(1);
            let recomputed = annuity_payment(ledger.balance, current_rate, remaining)?.round_cents();
            log::debug!(
                "period {}: emi recomputed {} -> {} over {} remaining periods",
                period,
                payment,
                recomputed,
                remaining
            );
            payment = recomputed;
        }
    }

    log::warn!(
        "amortization from {} hit the {} period cap with {} outstanding",
        request.start_date,
        period_cap,
        ledger.balance
    );
    Err(CalculatorError::ScheduleDidNotTerminate {
        periods: period_cap,
        remaining_balance: ledger.balance,
    })
}

/// run the request with and without its prepayments
pub fn compare_prepayment_savings(
    request: &AmortizationRequest,
    limits: &ScheduleLimits,
) -> Result<PrepaymentSavings> {
    let baseline_request = AmortizationRequest {
        prepayments: Vec::new(),
        ..request.clone()
    };
    let baseline = generate_payment_amortization(&baseline_request, limits)?;
    let prepaid = generate_payment_amortization(request, limits)?;

    // the closing row may be a partial installment, so read the one before it
    let final_regular_payment = prepaid
        .rows
        .iter()
        .rev()
        .nth(1)
        .or(prepaid.rows.last())
        .map_or(prepaid.regular_payment, |r| r.scheduled_payment);

    Ok(PrepaymentSavings {
        baseline_interest: baseline.total_interest,
        interest_with_prepayments: prepaid.total_interest,
        interest_saved: baseline.total_interest - prepaid.total_interest,
        baseline_term_months: baseline.term_months,
        term_months: prepaid.term_months,
        periods_saved: baseline.term_months.saturating_sub(prepaid.term_months),
        baseline_payment: baseline.regular_payment,
        final_regular_payment,
    })
}

/// date label for `period`: one month per period after the start date
pub fn period_date(start_date: NaiveDate, period: u32) -> Result<NaiveDate> {
    start_date
        .checked_add_months(Months::new(period))
        .ok_or_else(|| CalculatorError::InvalidDate {
            message: format!("{start_date} plus {period} months is out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::compute_schedule;
    use crate::types::PrepaymentMode;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn limits() -> ScheduleLimits {
        ScheduleLimits::default()
    }

    fn base_request() -> AmortizationRequest {
        AmortizationRequest::fixed_term(
            Money::from_major(300_000),
            Rate::from_percent(dec!(6.5)),
            360,
            date(2024, 1, 1),
        )
    }

    #[test]
    fn test_matches_base_engine_without_events() {
        let dated = generate_payment_amortization(&base_request(), &limits()).unwrap();
        let plain = compute_schedule(
            Money::from_major(300_000),
            Rate::from_percent(dec!(6.5)),
            360,
            &[],
            &limits(),
        )
        .unwrap();

        assert_eq!(dated.regular_payment, plain.regular_payment);
        assert_eq!(dated.total_interest, plain.total_interest);
        assert_eq!(dated.term_months, plain.term_months);
        assert_eq!(dated.rows[0].date, Some(date(2024, 2, 1)));
        assert_eq!(dated.final_payment_date(), Some(date(2054, 1, 1)));
    }

    #[test]
    fn test_period_dates_clamp_to_month_end() {
        assert_eq!(period_date(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(period_date(date(2024, 1, 31), 2).unwrap(), date(2024, 3, 31));
    }

    #[test]
    fn test_reduce_tenure_keeps_payment() {
        let request = base_request().with_prepayment(Prepayment::one_time(
            date(2025, 6, 10),
            Money::from_major(50_000),
            PrepaymentMode::ReduceTenure,
        ));
        let result = generate_payment_amortization(&request, &limits()).unwrap();

        let june = result.rows.iter().find(|r| r.date == Some(date(2025, 6, 1))).unwrap();
        assert_eq!(june.extra_payment, Money::from_major(50_000));
        assert_eq!(june.principal + june.interest, june.total_payment);

        // every full installment is the original EMI
        assert!(result.rows[..result.rows.len() - 1]
            .iter()
            .all(|r| r.scheduled_payment == result.regular_payment));
        assert!(result.term_months < 360);
    }

    #[test]
    fn test_reduce_emi_recomputes_payment() {
        let request = base_request().with_prepayment(Prepayment::one_time(
            date(2025, 6, 10),
            Money::from_major(50_000),
            PrepaymentMode::ReduceEmi,
        ));
        let result = generate_payment_amortization(&request, &limits()).unwrap();

        let june = result.rows.iter().position(|r| r.date == Some(date(2025, 6, 1))).unwrap();
        let june_row = &result.rows[june];
        let next = &result.rows[june + 1];

        let expected = annuity_payment(
            june_row.closing_balance,
            Rate::from_percent(dec!(6.5)),
            360 - june_row.period,
        )
        .unwrap()
        .round_cents();

        assert_eq!(next.scheduled_payment, expected);
        assert!(next.scheduled_payment < result.regular_payment);
        // term length is preserved
        assert!(result.term_months.abs_diff(360) <= 1);
    }

    #[test]
    fn test_rate_change_applies_from_effective_date() {
        let request = base_request().with_rate_change(RateChange::new(date(2026, 1, 1), Rate::from_percent(dec!(7.5))));
        let result = generate_payment_amortization(&request, &limits()).unwrap();

        let dec_2025 = result.rows.iter().find(|r| r.date == Some(date(2025, 12, 1))).unwrap();
        let jan_2026 = result.rows.iter().find(|r| r.date == Some(date(2026, 1, 1))).unwrap();

        assert_eq!(dec_2025.annual_rate, Rate::from_percent(dec!(6.5)));
        assert_eq!(jan_2026.annual_rate, Rate::from_percent(dec!(7.5)));
        assert_eq!(jan_2026.interest, jan_2026.opening_balance.monthly_interest(Rate::from_percent(dec!(7.5))));

        // payment unchanged, so the higher rate stretches the term
        assert_eq!(jan_2026.scheduled_payment, result.regular_payment);
        assert!(result.term_months > 360);
    }

    #[test]
    fn test_rate_change_and_reduce_emi_same_month_uses_new_rate() {
        let new_rate = Rate::from_percentage(7);
        let request = base_request()
            .with_rate_change(RateChange::new(date(2026, 3, 1), new_rate))
            .with_prepayment(Prepayment::one_time(
                date(2026, 3, 20),
                Money::from_major(25_000),
                PrepaymentMode::ReduceEmi,
            ));
        let result = generate_payment_amortization(&request, &limits()).unwrap();

        let index = result.rows.iter().position(|r| r.date == Some(date(2026, 3, 1))).unwrap();
        let march = &result.rows[index];

        // interest at the new rate on the balance before the prepayment
        assert_eq!(march.annual_rate, new_rate);
        assert_eq!(march.interest, march.opening_balance.monthly_interest(new_rate));
        assert_eq!(march.extra_payment, Money::from_major(25_000));

        let expected = annuity_payment(march.closing_balance, new_rate, 360 - march.period)
            .unwrap()
            .round_cents();
        assert_eq!(result.rows[index + 1].scheduled_payment, expected);
    }

    #[test]
    fn test_prepayment_capped_at_balance() {
        let request = AmortizationRequest::fixed_term(Money::from_major(10_000), Rate::from_percentage(12), 12, date(2024, 1, 1))
            .with_prepayment(Prepayment::one_time(date(2024, 3, 1), Money::from_major(50_000), PrepaymentMode::ReduceTenure));
        let result = generate_payment_amortization(&request, &limits()).unwrap();

        assert_eq!(result.term_months, 2);
        let last = result.rows.last().unwrap();
        assert_eq!(last.closing_balance, Money::ZERO);
        assert_eq!(last.principal, last.opening_balance);
    }

    #[test]
    fn test_fixed_payment_mode() {
        let result = solve_for_term(
            Money::from_major(100_000),
            Rate::from_percentage(10),
            Money::from_major(2_000),
            date(2024, 1, 1),
            &limits(),
        )
        .unwrap();

        let expected_term =
            calculate_loan_term(Money::from_major(100_000), Rate::from_percentage(10), Money::from_major(2_000)).unwrap();
        assert_eq!(result.term_months, expected_term);
        assert_eq!(result.regular_payment, Money::from_major(2_000));
        assert!(result.rows.last().unwrap().total_payment <= Money::from_major(2_000));
    }

    #[test]
    fn test_fixed_payment_too_low() {
        let err = solve_for_term(
            Money::from_major(100_000),
            Rate::from_percentage(10),
            Money::from_major(800),
            date(2024, 1, 1),
            &limits(),
        )
        .unwrap_err();

        assert!(matches!(err, CalculatorError::PaymentTooLow { .. }));
    }

    #[test]
    fn test_rate_rise_causing_negative_amortization() {
        let request = AmortizationRequest::fixed_term(Money::from_major(100_000), Rate::from_percentage(3), 360, date(2024, 1, 1))
            .with_rate_change(RateChange::new(date(2025, 1, 1), Rate::from_percentage(12)));

        assert!(matches!(
            generate_payment_amortization(&request, &limits()),
            Err(CalculatorError::NegativeAmortization { period: 12, .. })
        ));
    }

    #[test]
    fn test_cap_exhaustion_surfaces() {
        // the rate rise stretches the schedule well past 400 periods
        let request = base_request().with_rate_change(RateChange::new(date(2026, 1, 1), Rate::from_percent(dec!(7.5))));
        let tight = ScheduleLimits {
            max_periods: 400,
            ..ScheduleLimits::default()
        };

        assert!(matches!(
            generate_payment_amortization(&request, &tight),
            Err(CalculatorError::ScheduleDidNotTerminate { periods: 400, .. })
        ));
    }

    #[test]
    fn test_event_cap_never_cuts_the_contractual_term() {
        let tight = ScheduleLimits {
            extra_periods: 0,
            max_periods: 24,
            ..ScheduleLimits::default()
        };
        let result = solve_for_payment(Money::from_major(100_000), Rate::from_percentage(5), 360, date(2024, 1, 1), &tight).unwrap();
        assert_eq!(result.rows.len(), 360);

        let request = base_request().with_prepayment(Prepayment::monthly(
            date(2024, 2, 1),
            Money::from_major(100),
            PrepaymentMode::ReduceTenure,
        ));
        let result = generate_payment_amortization(&request, &tight).unwrap();
        assert!(result.term_months > 24);
    }

    #[test]
    fn test_fixed_payment_term_beyond_period_cap() {
        // barely above the 833.33 monthly interest, so the loan runs 1415 periods
        let payment = Money::from_decimal(dec!(833.34));
        let result = solve_for_term(
            Money::from_major(100_000),
            Rate::from_percentage(10),
            payment,
            date(2024, 1, 1),
            &limits(),
        )
        .unwrap();

        let expected_term = calculate_loan_term(Money::from_major(100_000), Rate::from_percentage(10), payment).unwrap();
        assert_eq!(expected_term, 1415);
        assert_eq!(result.term_months, expected_term);
        assert_eq!(result.rows.last().unwrap().closing_balance, Money::ZERO);
    }

    #[test]
    fn test_prepayment_savings() {
        let request = base_request().with_prepayment(Prepayment::monthly(
            date(2024, 2, 1),
            Money::from_major(250),
            PrepaymentMode::ReduceTenure,
        ));
        let savings = compare_prepayment_savings(&request, &limits()).unwrap();

        assert!(savings.interest_saved.is_positive());
        assert!(savings.periods_saved > 0);
        assert_eq!(savings.baseline_term_months, 360);
        assert_eq!(savings.final_regular_payment, savings.baseline_payment);
        assert_eq!(
            savings.baseline_interest - savings.interest_with_prepayments,
            savings.interest_saved
        );
    }
}
