use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleLimits;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::compute_schedule;
use crate::types::VaLoanPurpose;

use super::{base_loan_amount, loan_to_value, overlay_rows, HousingCosts, OverlayRow};

/// VA loan inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VaInput {
    pub home_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    #[serde(default)]
    pub purpose: VaLoanPurpose,
    #[serde(default = "default_first_use")]
    pub first_use: bool,
    /// service-connected disability waives the funding fee
    #[serde(default)]
    pub disability_exempt: bool,
    #[serde(default)]
    pub housing_costs: HousingCosts,
}

fn default_first_use() -> bool {
    true
}

impl VaInput {
    pub fn new(home_price: Money, down_payment: Money, annual_rate: Rate, term_months: u32) -> Self {
        Self {
            home_price,
            down_payment,
            annual_rate,
            term_months,
            purpose: VaLoanPurpose::Purchase,
            first_use: true,
            disability_exempt: false,
            housing_costs: HousingCosts::default(),
        }
    }

    pub fn with_purpose(mut self, purpose: VaLoanPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn subsequent_use(mut self) -> Self {
        self.first_use = false;
        self
    }

    pub fn disability_exempt(mut self) -> Self {
        self.disability_exempt = true;
        self
    }

    pub fn with_housing_costs(mut self, costs: HousingCosts) -> Self {
        self.housing_costs = costs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaResult {
    pub base_loan: Money,
    pub funding_fee_rate: Rate,
    pub funding_fee: Money,
    /// base loan with the funding fee financed in
    pub total_loan: Money,
    pub loan_to_value: Rate,
    pub monthly_principal_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    /// P&I + tax + insurance + HOA, no mortgage insurance on VA loans
    pub total_monthly_payment: Money,
    pub term_months: u32,
    pub total_interest: Money,
    /// down payment plus every monthly housing payment
    pub total_cost: Money,
    pub rows: Vec<OverlayRow>,
}

/// funding fee as a fraction of the base loan
pub fn va_funding_fee_rate(
    down_payment_percent: Decimal,
    purpose: VaLoanPurpose,
    first_use: bool,
    disability_exempt: bool,
) -> Rate {
    if disability_exempt {
        return Rate::ZERO;
    }

    let percent = match purpose {
        VaLoanPurpose::Irrrl => dec!(0.5),
        VaLoanPurpose::CashOutRefinance if first_use => dec!(2.15),
        VaLoanPurpose::CashOutRefinance => dec!(3.3),
        VaLoanPurpose::Purchase if down_payment_percent >= dec!(10) => dec!(1.25),
        VaLoanPurpose::Purchase if down_payment_percent >= dec!(5) => dec!(1.5),
        VaLoanPurpose::Purchase if first_use => dec!(2.15),
        VaLoanPurpose::Purchase => dec!(3.3),
    };
    Rate::from_percent(percent)
}

/// VA overlay: finance the funding fee, amortize, pass housing costs through
pub fn calculate_va(input: &VaInput, limits: &ScheduleLimits) -> Result<VaResult> {
    let base_loan = base_loan_amount(input.home_price, input.down_payment)?;
    input.housing_costs.validate()?;

    let down_payment_percent = loan_to_value(input.down_payment, input.home_price)?.as_percentage();
    let funding_fee_rate = va_funding_fee_rate(
        down_payment_percent,
        input.purpose,
        input.first_use,
        input.disability_exempt,
    );
    let funding_fee = base_loan.percentage(funding_fee_rate).round_cents();
    let total_loan = base_loan + funding_fee;

    let schedule = compute_schedule(total_loan, input.annual_rate, input.term_months, &[], limits)?;
    let rows = overlay_rows(&schedule, &input.housing_costs, |_, _| Money::ZERO);

    let total_monthly_payment = rows.first().map_or(Money::ZERO, |r| r.total_monthly_payment);
    let total_cost = input.down_payment + rows.iter().map(|r| r.total_monthly_payment).sum::<Money>();

    log::debug!(
        "va loan {} ({:?}, funding fee {} at {})",
        total_loan,
        input.purpose,
        funding_fee,
        funding_fee_rate
    );

    Ok(VaResult {
        base_loan,
        funding_fee_rate,
        funding_fee,
        total_loan,
        loan_to_value: loan_to_value(base_loan, input.home_price)?,
        monthly_principal_interest: schedule.regular_payment,
        monthly_property_tax: input.housing_costs.monthly_property_tax(),
        monthly_insurance: input.housing_costs.monthly_insurance(),
        monthly_hoa: input.housing_costs.monthly_hoa.round_cents(),
        total_monthly_payment,
        term_months: schedule.term_months,
        total_interest: schedule.total_interest,
        total_cost,
        rows,
    })
}
