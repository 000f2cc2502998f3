pub mod fha;
pub mod va;

pub use fha::{calculate_fha, FhaInput, FhaResult};
pub use va::{calculate_va, va_funding_fee_rate, VaInput, VaResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::payments::{AmortizationRow, PaymentResult};

/// flat monthly add-ons that ride on top of principal and interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HousingCosts {
    pub annual_property_tax: Money,
    pub annual_insurance: Money,
    pub monthly_hoa: Money,
}

impl HousingCosts {
    pub fn new(annual_property_tax: Money, annual_insurance: Money, monthly_hoa: Money) -> Self {
        Self {
            annual_property_tax,
            annual_insurance,
            monthly_hoa,
        }
    }

    pub fn monthly_property_tax(&self) -> Money {
        (self.annual_property_tax / Decimal::from(12)).round_cents()
    }

    pub fn monthly_insurance(&self) -> Money {
        (self.annual_insurance / Decimal::from(12)).round_cents()
    }

    /// tax + insurance + HOA for one period
    pub fn monthly_total(&self) -> Money {
        self.monthly_property_tax() + self.monthly_insurance() + self.monthly_hoa.round_cents()
    }

    pub fn validate(&self) -> Result<()> {
        if self.annual_property_tax.is_negative()
            || self.annual_insurance.is_negative()
            || self.monthly_hoa.is_negative()
        {
            return Err(CalculatorError::invalid_input(
                "housing_costs",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// amortization row plus the loan-type charges for that period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRow {
    pub amortization: AmortizationRow,
    pub mortgage_insurance: Money,
    pub housing_costs: Money,
    pub total_monthly_payment: Money,
}

/// layer per-period insurance and flat housing costs over a base schedule
pub(crate) fn overlay_rows<F>(schedule: &PaymentResult, costs: &HousingCosts, insurance: F) -> Vec<OverlayRow>
where
    F: Fn(usize, &AmortizationRow) -> Money,
{
    let monthly_costs = costs.monthly_total();
    schedule
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mortgage_insurance = insurance(index, row);
            OverlayRow {
                amortization: row.clone(),
                mortgage_insurance,
                housing_costs: monthly_costs,
                total_monthly_payment: row.total_payment + mortgage_insurance + monthly_costs,
            }
        })
        .collect()
}

/// home price minus down payment, with both checked
pub(crate) fn base_loan_amount(home_price: Money, down_payment: Money) -> Result<Money> {
    if !home_price.is_positive() {
        return Err(CalculatorError::invalid_input(
            "home_price",
            "must be greater than zero",
        ));
    }
    if down_payment.is_negative() || down_payment >= home_price {
        return Err(CalculatorError::invalid_input(
            "down_payment",
            "must be at least zero and below the home price",
        ));
    }
    Ok((home_price - down_payment).round_cents())
}

/// loan-to-value ratio
pub fn loan_to_value(loan_amount: Money, property_value: Money) -> Result<Rate> {
    if !property_value.is_positive() {
        return Err(CalculatorError::invalid_input(
            "property_value",
            "must be greater than zero",
        ));
    }
    Ok(Rate::from_decimal(
        loan_amount.as_decimal() / property_value.as_decimal(),
    ))
}
