use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{FhaConfig, ScheduleLimits};
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::compute_schedule;

use super::{base_loan_amount, loan_to_value, overlay_rows, HousingCosts, OverlayRow};

/// FHA purchase inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FhaInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    #[serde(default)]
    pub housing_costs: HousingCosts,
}

impl FhaInput {
    pub fn new(home_price: Money, down_payment: Money, annual_rate: Rate, term_months: u32) -> Self {
        Self {
            home_price,
            down_payment,
            annual_rate,
            term_months,
            housing_costs: HousingCosts::default(),
        }
    }

    pub fn with_housing_costs(mut self, costs: HousingCosts) -> Self {
        self.housing_costs = costs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhaResult {
    pub base_loan: Money,
    pub upfront_mip: Money,
    /// base loan with the upfront premium financed in
    pub total_loan: Money,
    /// base loan over home price
    pub loan_to_value: Rate,
    pub meets_minimum_down_payment: bool,
    /// number of periods that carry annual MIP
    pub mip_months: u32,
    pub monthly_principal_interest: Money,
    pub first_month_mip: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    /// first-period housing payment: P&I + MIP + tax + insurance + HOA
    pub total_monthly_payment: Money,
    pub term_months: u32,
    pub total_interest: Money,
    pub total_mip: Money,
    /// down payment plus every monthly housing payment
    pub total_cost: Money,
    pub rows: Vec<OverlayRow>,
}

/// FHA overlay: finance the upfront MIP, then charge annual MIP re-based on
/// the balance at the start of each 12-period block.
pub fn calculate_fha(input: &FhaInput, config: &FhaConfig, limits: &ScheduleLimits) -> Result<FhaResult> {
    let base_loan = base_loan_amount(input.home_price, input.down_payment)?;
    input.housing_costs.validate()?;

    let upfront_mip = base_loan.percentage(config.upfront_mip_rate).round_cents();
    let total_loan = base_loan + upfront_mip;
    let ltv = loan_to_value(base_loan, input.home_price)?;
    let down_payment_rate = loan_to_value(input.down_payment, input.home_price)?;

    let schedule = compute_schedule(total_loan, input.annual_rate, input.term_months, &[], limits)?;

    let mip_months = if ltv > config.lifetime_mip_ltv {
        schedule.term_months
    } else {
        config.reduced_mip_months.min(schedule.term_months)
    };

    let rows = overlay_rows(&schedule, &input.housing_costs, |index, row| {
        if row.period > mip_months {
            return Money::ZERO;
        }
        let block_start = &schedule.rows[index - index % 12];
        let annual_mip = block_start.opening_balance.percentage(config.annual_mip_rate);
        (annual_mip / Decimal::from(12)).round_cents()
    });

    let total_mip = rows.iter().map(|r| r.mortgage_insurance).sum();
    let first_month_mip = rows.first().map_or(Money::ZERO, |r| r.mortgage_insurance);
    let total_monthly_payment = rows.first().map_or(Money::ZERO, |r| r.total_monthly_payment);
    let total_cost = input.down_payment + rows.iter().map(|r| r.total_monthly_payment).sum::<Money>();

    log::debug!(
        "fha loan {} (upfront mip {}), ltv {}, mip for {} periods",
        total_loan,
        upfront_mip,
        ltv,
        mip_months
    );

    Ok(FhaResult {
        base_loan,
        upfront_mip,
        total_loan,
        loan_to_value: ltv,
        meets_minimum_down_payment: down_payment_rate >= config.minimum_down_payment_rate,
        mip_months,
        monthly_principal_interest: schedule.regular_payment,
        first_month_mip,
        monthly_property_tax: input.housing_costs.monthly_property_tax(),
        monthly_insurance: input.housing_costs.monthly_insurance(),
        monthly_hoa: input.housing_costs.monthly_hoa.round_cents(),
        total_monthly_payment,
        term_months: schedule.term_months,
        total_interest: schedule.total_interest,
        total_mip,
        total_cost,
        rows,
    })
}
