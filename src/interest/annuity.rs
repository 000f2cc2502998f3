use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

use super::{validate_loan_inputs, validate_principal_and_rate};

/// slack subtracted before rounding a solved term up, absorbs ln() noise
const TERM_ROUNDING_SLACK: Decimal = dec!(0.000000001);

/// (1 + r)^-n, built by repeated division so long terms shrink toward zero
/// instead of overflowing
pub fn discount_factor(period_rate: Decimal, periods: u32) -> Result<Decimal> {
    let step = Decimal::ONE
        .checked_div(Decimal::ONE + period_rate)
        .ok_or_else(|| CalculatorError::overflow("discount factor"))?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(step)
            .ok_or_else(|| CalculatorError::overflow("discount factor"))?;
    }
    Ok(factor)
}

/// EMI = P * r / (1 - (1 + r)^-n), straight-line when r = 0.
///
/// Unrounded; callers decide where currency rounding happens.
pub fn annuity_payment(principal: Money, annual_rate: Rate, months: u32) -> Result<Money> {
    if months == 0 {
        return Ok(principal);
    }

    let r = annual_rate.monthly_rate().as_decimal();
    if r.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .ok_or_else(|| CalculatorError::overflow("annuity payment"))?;
    let denominator = Decimal::ONE - discount_factor(r, months)?;

    numerator
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or_else(|| CalculatorError::overflow("annuity payment"))
}

/// regular monthly payment, rounded to the smallest currency unit
pub fn calculate_monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Result<Money> {
    validate_loan_inputs(principal, annual_rate, term_months)?;
    Ok(annuity_payment(principal, annual_rate, term_months)?.round_cents())
}

/// smallest payment that still amortizes `principal`: first-period interest plus one cent
pub fn minimum_viable_payment(principal: Money, annual_rate: Rate) -> Money {
    principal.monthly_interest(annual_rate) + Money::CENT
}

/// number of months a fixed `payment` needs to amortize `principal`.
///
/// n = ceil(-ln(1 - r*P/A) / ln(1 + r)), or ceil(P/A) at zero rate.
pub fn calculate_loan_term(principal: Money, annual_rate: Rate, payment: Money) -> Result<u32> {
    validate_principal_and_rate(principal, annual_rate)?;
    if !payment.is_positive() {
        return Err(CalculatorError::invalid_input(
            "payment",
            "must be greater than zero",
        ));
    }

    let p = principal.as_decimal();
    let a = payment.as_decimal();
    let r = annual_rate.monthly_rate().as_decimal();

    let periods = if r.is_zero() {
        p / a
    } else {
        if a <= p * r {
            return Err(CalculatorError::PaymentTooLow {
                payment,
                minimum: minimum_viable_payment(principal, annual_rate),
            });
        }
        let remaining_fraction = Decimal::ONE - r * p / a;
        -remaining_fraction.ln() / (Decimal::ONE + r).ln()
    };

    let months = (periods - TERM_ROUNDING_SLACK)
        .ceil()
        .to_u32()
        .ok_or_else(|| CalculatorError::CalculationError {
            message: format!("loan term {periods} is out of range"),
        })?;

    Ok(months.max(1))
}
