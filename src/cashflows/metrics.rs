use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

use super::npv::{discounted_flows, validate_discount_rate};

/// modified IRR: outflows financed at `finance_rate`, inflows reinvested at
/// `reinvestment_rate`. None when the flows lack an outflow or an inflow.
///
/// (FV_in / PV_out)^(1/n) - 1 is evaluated as
/// (1 + reinvestment) * (PV_in / PV_out)^(1/n) - 1, with PV_in discounted at
/// the reinvestment rate, so long horizons never compound past Decimal range
pub fn mirr(cash_flows: &[Money], finance_rate: Rate, reinvestment_rate: Rate) -> Result<Option<Rate>> {
    validate_discount_rate(finance_rate)?;
    validate_discount_rate(reinvestment_rate)?;
    if cash_flows.len() < 2 {
        return Ok(None);
    }

    let periods = Decimal::from((cash_flows.len() - 1) as u64);
    let (outflows, inflows): (Vec<Money>, Vec<Money>) = cash_flows
        .iter()
        .map(|cf| {
            if cf.is_negative() {
                (-*cf, Money::ZERO)
            } else {
                (Money::ZERO, *cf)
            }
        })
        .unzip();

    let present_value = |flows: &[Money], rate: Rate, context: &str| -> Result<Decimal> {
        discounted_flows(flows, rate.as_decimal())
            .map(|values| values.into_iter().sum())
            .ok_or_else(|| CalculatorError::overflow(context))
    };
    let cost = present_value(&outflows, finance_rate, "mirr outflows")?;
    let proceeds = present_value(&inflows, reinvestment_rate, "mirr inflows")?;

    if cost.is_zero() || proceeds.is_zero() {
        return Ok(None);
    }

    let growth = (proceeds / cost)
        .checked_ln()
        .and_then(|ln| ln.checked_div(periods))
        .and_then(|exponent| exponent.checked_exp())
        .ok_or_else(|| CalculatorError::overflow("mirr"))?;
    let rate = (Decimal::ONE + reinvestment_rate.as_decimal()) * growth - Decimal::ONE;
    Ok(Some(Rate::from_decimal(rate)))
}

/// fractional period at which the running total first turns non-negative,
/// interpolated inside the recovering period
fn recovery_point(values: &[Decimal]) -> Option<Decimal> {
    let mut cumulative = Decimal::ZERO;
    for (t, value) in values.iter().enumerate() {
        let previous = cumulative;
        cumulative += *value;
        if cumulative >= Decimal::ZERO {
            if t == 0 {
                return Some(Decimal::ZERO);
            }
            let fraction = -previous / *value;
            return Some(Decimal::from(t as u64 - 1) + fraction);
        }
    }
    None
}

/// simple payback; None means the outlay is never recovered
pub fn payback_period(cash_flows: &[Money]) -> Option<Decimal> {
    let values: Vec<Decimal> = cash_flows.iter().map(Money::as_decimal).collect();
    recovery_point(&values)
}

/// payback on flows discounted at `rate`
pub fn discounted_payback_period(cash_flows: &[Money], rate: Rate) -> Result<Option<Decimal>> {
    validate_discount_rate(rate)?;
    let values = discounted_flows(cash_flows, rate.as_decimal())
        .ok_or_else(|| CalculatorError::overflow("discounted payback"))?;
    Ok(recovery_point(&values))
}
