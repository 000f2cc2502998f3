use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

use super::metrics::{mirr, payback_period};
use super::npv::npv_with_derivative;
use super::{cash_flow_table, CashFlowItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    pub irr: Rate,
    pub npv_at_irr: Money,
    /// false when the iteration cap was reached: `irr` is the best estimate
    pub converged: bool,
    pub iterations: u32,
    pub mirr: Option<Rate>,
    /// None when the outlay is never recovered
    pub payback_period: Option<Decimal>,
    pub cash_flows: Vec<CashFlowItem>,
}

impl IrrResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// step halvings tried before a Newton step is abandoned
const MAX_STEP_HALVINGS: u32 = 64;

/// one evaluated point on the NPV curve
#[derive(Debug, Clone, Copy)]
struct Iterate {
    rate: Decimal,
    npv: Decimal,
    derivative: Decimal,
}

impl Iterate {
    fn at(cash_flows: &[Money], rate: Decimal) -> Option<Self> {
        npv_with_derivative(cash_flows, rate).map(|(npv, derivative)| Self {
            rate,
            npv,
            derivative,
        })
    }
}

fn has_sign_change(cash_flows: &[Money]) -> bool {
    cash_flows.iter().any(Money::is_positive) && cash_flows.iter().any(Money::is_negative)
}

/// Damped Newton step: halve the step until the NPV can be evaluated and its
/// magnitude drops. None when no such point is found.
fn damped_step<F>(cash_flows: &[Money], current: &Iterate, clamp: F) -> Option<Iterate>
where
    F: Fn(Decimal) -> Decimal,
{
    let mut step = current.npv.checked_div(current.derivative)?;
    for _ in 0..MAX_STEP_HALVINGS {
        let candidate = clamp(current.rate - step);
        if let Some(next) = Iterate::at(cash_flows, candidate) {
            if next.npv.abs() < current.npv.abs() {
                return Some(next);
            }
        }
        step /= Decimal::TWO;
    }
    None
}

/// Newton-Raphson on NPV(rate) = 0 from `config.initial_guess`.
///
/// Steps are damped: an iterate that overflows or moves away from zero is
/// pulled halfway back toward the current rate, so long series that would
/// otherwise overshoot to the rate bounds still converge. With several sign
/// changes there may be several roots; the one reached from the seed is
/// returned. `iterations` counts Newton steps taken.
pub fn solve_irr(cash_flows: &[Money], config: &SolverConfig) -> Result<IrrResult> {
    if cash_flows.len() < 2 {
        return Err(CalculatorError::invalid_input(
            "cash_flows",
            "at least two cash flows are required",
        ));
    }
    if !has_sign_change(cash_flows) {
        return Err(CalculatorError::NoSignChange);
    }

    let clamp = |rate: Decimal| {
        rate.max(config.min_rate.as_decimal())
            .min(config.max_rate.as_decimal())
    };

    let mut current = Iterate::at(cash_flows, clamp(config.initial_guess.as_decimal()))
        .ok_or_else(|| CalculatorError::overflow("irr initial guess"))?;
    let mut iterations = 0;

    let converged = loop {
        if current.npv.abs() < config.tolerance {
            break true;
        }
        if iterations >= config.max_iterations {
            break false;
        }
        iterations += 1;
        match damped_step(cash_flows, &current, clamp) {
            Some(next) => current = next,
            None => break false,
        }
    };

    if !converged {
        log::warn!(
            "irr did not converge after {} iterations, best estimate {} with npv {}",
            iterations,
            current.rate,
            current.npv
        );
    }

    let irr = Rate::from_decimal(current.rate);
    Ok(IrrResult {
        irr,
        npv_at_irr: Money::from_decimal(current.npv),
        converged,
        iterations,
        mirr: mirr(cash_flows, config.finance_rate, config.reinvestment_rate)?,
        payback_period: payback_period(cash_flows),
        cash_flows: cash_flow_table(cash_flows, irr)?,
    })
}
