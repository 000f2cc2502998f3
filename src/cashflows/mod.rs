pub mod irr;
pub mod metrics;
pub mod npv;

pub use irr::{solve_irr, IrrResult};
pub use metrics::{discounted_payback_period, mirr, payback_period};
pub use npv::{npv, npv_sensitivity, SensitivityPoint};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// one period of a discounted cash-flow table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    pub period: u32,
    pub cash_flow: Money,
    pub cumulative: Money,
    pub discounted: Money,
    pub cumulative_npv: Money,
}

/// per-period raw and discounted running totals at `rate`
pub fn cash_flow_table(cash_flows: &[Money], rate: Rate) -> Result<Vec<CashFlowItem>> {
    npv::validate_discount_rate(rate)?;
    let discounted = npv::discounted_flows(cash_flows, rate.as_decimal())
        .ok_or_else(|| CalculatorError::overflow("cash flow table"))?;

    let mut cumulative = Money::ZERO;
    let mut cumulative_npv = Decimal::ZERO;
    Ok(cash_flows
        .iter()
        .zip(discounted)
        .enumerate()
        .map(|(period, (cash_flow, present_value))| {
            cumulative += *cash_flow;
            cumulative_npv += present_value;
            CashFlowItem {
                period: period as u32,
                cash_flow: *cash_flow,
                cumulative,
                discounted: Money::from_decimal(present_value),
                cumulative_npv: Money::from_decimal(cumulative_npv),
            }
        })
        .collect())
}
