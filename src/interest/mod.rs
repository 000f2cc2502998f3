pub mod annuity;

pub use annuity::{
    annuity_payment, calculate_loan_term, calculate_monthly_payment, discount_factor,
    minimum_viable_payment,
};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// validate the common loan inputs shared by every schedule entry point
pub fn validate_loan_inputs(principal: Money, annual_rate: Rate, term_months: u32) -> Result<()> {
    validate_principal_and_rate(principal, annual_rate)?;
    if term_months == 0 {
        return Err(CalculatorError::invalid_input(
            "term_months",
            "must be a positive number of months",
        ));
    }
    Ok(())
}

pub fn validate_principal_and_rate(principal: Money, annual_rate: Rate) -> Result<()> {
    if !principal.is_positive() {
        return Err(CalculatorError::invalid_input(
            "principal",
            "must be greater than zero",
        ));
    }
    if annual_rate.is_negative() {
        return Err(CalculatorError::invalid_input(
            "annual_rate",
            "must not be negative",
        ));
    }
    Ok(())
}
