use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// one point on an NPV-vs-rate curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub rate: Rate,
    pub npv: Money,
}

/// present value of each flow, period 0 undiscounted.
///
/// Compounds 1 / (1 + r) so distant flows shrink toward zero; None once the
/// factor overflows, which only happens for rates close to -100%
pub(crate) fn discounted_flows(cash_flows: &[Money], rate: Decimal) -> Option<Vec<Decimal>> {
    let factor = Decimal::ONE.checked_div(Decimal::ONE + rate)?;
    let mut discount = Decimal::ONE;
    let mut values = Vec::with_capacity(cash_flows.len());

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(factor)?;
        }
        values.push(cf.as_decimal().checked_mul(discount)?);
    }
    Some(values)
}

/// NPV and its derivative with respect to the rate
pub(crate) fn npv_with_derivative(cash_flows: &[Money], rate: Decimal) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, pv) in discounted_flows(cash_flows, rate)?.into_iter().enumerate() {
        npv = npv.checked_add(pv)?;
        if t > 0 {
            let term = Decimal::from(t as u64).checked_mul(pv)?.checked_div(one_plus_r)?;
            derivative = derivative.checked_sub(term)?;
        }
    }
    Some((npv, derivative))
}

pub(crate) fn validate_discount_rate(rate: Rate) -> Result<()> {
    if rate.as_decimal() <= -Decimal::ONE {
        return Err(CalculatorError::invalid_input(
            "rate",
            "discount rate must be greater than -100%",
        ));
    }
    Ok(())
}

/// net present value, first flow at t = 0
pub fn npv(cash_flows: &[Money], rate: Rate) -> Result<Money> {
    validate_discount_rate(rate)?;

    let total = discounted_flows(cash_flows, rate.as_decimal())
        .and_then(|values| {
            values
                .into_iter()
                .try_fold(Decimal::ZERO, |acc, pv| acc.checked_add(pv))
        })
        .ok_or_else(|| CalculatorError::overflow("npv"))?;

    Ok(Money::from_decimal(total))
}

/// NPV at `steps + 1` evenly spaced rates from `from` to `to` inclusive
pub fn npv_sensitivity(cash_flows: &[Money], from: Rate, to: Rate, steps: u32) -> Result<Vec<SensitivityPoint>> {
    if steps == 0 {
        return Err(CalculatorError::invalid_input("steps", "must be at least 1"));
    }
    if to < from {
        return Err(CalculatorError::invalid_input(
            "rate_range",
            "upper rate must not be below lower rate",
        ));
    }
    validate_discount_rate(from)?;

    let step = (to.as_decimal() - from.as_decimal()) / Decimal::from(steps);
    (0..=steps)
        .map(|i| {
            let rate = if i == steps {
                to
            } else {
                Rate::from_decimal(from.as_decimal() + step * Decimal::from(i))
            };
            Ok(SensitivityPoint {
                rate,
                npv: npv(cash_flows, rate)?,
            })
        })
        .collect()
}
