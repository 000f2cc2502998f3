use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// periods the base engine may run past the contractual term
pub const DEFAULT_EXTRA_PERIODS: u32 = 1200;
/// period cap for event-driven runs (100 years of months)
pub const DEFAULT_MAX_PERIODS: u32 = 1200;
pub const DEFAULT_IRR_GUESS: Decimal = dec!(0.10);
pub const DEFAULT_IRR_TOLERANCE: Decimal = dec!(0.00001);
pub const DEFAULT_IRR_MAX_ITERATIONS: u32 = 100;

/// bounds applied to schedule simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleLimits {
    /// base engine runs at most `term_months + extra_periods` periods
    pub extra_periods: u32,
    /// event-driven runs with prepayments or rate changes stop here, or at the
    /// contractual term if that is longer; runs without events use `extra_periods`
    pub max_periods: u32,
    /// a balance at or below this closes the loan
    pub balance_epsilon: Money,
    /// residual below this at the end of the scheduled term joins the final payment
    pub rounding_residual: Money,
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        Self {
            extra_periods: DEFAULT_EXTRA_PERIODS,
            max_periods: DEFAULT_MAX_PERIODS,
            balance_epsilon: Money::CENT,
            rounding_residual: Money::from_major(10),
        }
    }
}

/// Newton-Raphson settings for the IRR solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub initial_guess: Rate,
    /// stop once |NPV| falls below this
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// iterates are clamped into [min_rate, max_rate]
    pub min_rate: Rate,
    pub max_rate: Rate,
    /// MIRR: cost of funding the outflows
    pub finance_rate: Rate,
    /// MIRR: return earned on the inflows
    pub reinvestment_rate: Rate,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: Rate::from_decimal(DEFAULT_IRR_GUESS),
            tolerance: DEFAULT_IRR_TOLERANCE,
            max_iterations: DEFAULT_IRR_MAX_ITERATIONS,
            min_rate: Rate::from_decimal(dec!(-0.99)),
            max_rate: Rate::from_decimal(dec!(10)),
            finance_rate: Rate::from_decimal(DEFAULT_IRR_GUESS),
            reinvestment_rate: Rate::from_decimal(DEFAULT_IRR_GUESS),
        }
    }
}

/// FHA mortgage insurance parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FhaConfig {
    /// financed into the loan at closing
    pub upfront_mip_rate: Rate,
    /// charged on the balance at the start of each 12-period block
    pub annual_mip_rate: Rate,
    pub minimum_down_payment_rate: Rate,
    /// loans starting above this LTV pay MIP for the whole term
    pub lifetime_mip_ltv: Rate,
    /// MIP duration for loans starting at or below `lifetime_mip_ltv`
    pub reduced_mip_months: u32,
}

impl Default for FhaConfig {
    fn default() -> Self {
        Self {
            upfront_mip_rate: Rate::from_bps(175),
            annual_mip_rate: Rate::from_bps(55),
            minimum_down_payment_rate: Rate::from_bps(350),
            lifetime_mip_ltv: Rate::from_percentage(90),
            reduced_mip_months: 132,
        }
    }
}

/// top-level configuration, loadable from JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalculatorConfig {
    pub schedule: ScheduleLimits,
    pub solver: SolverConfig,
    pub fha: FhaConfig,
}

impl CalculatorConfig {
    /// parse from JSON, missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CalculatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schedule.max_periods == 0 {
            return Err(CalculatorError::invalid_input(
                "schedule.max_periods",
                "must be at least 1",
            ));
        }
        if self.schedule.balance_epsilon.is_negative() {
            return Err(CalculatorError::invalid_input(
                "schedule.balance_epsilon",
                "must not be negative",
            ));
        }
        if self.solver.tolerance <= Decimal::ZERO {
            return Err(CalculatorError::invalid_input(
                "solver.tolerance",
                "must be greater than zero",
            ));
        }
        if self.solver.min_rate.as_decimal() <= dec!(-1)
            || self.solver.min_rate >= self.solver.max_rate
        {
            return Err(CalculatorError::invalid_input(
                "solver.min_rate",
                "must be above -100% and below max_rate",
            ));
        }
        if self.solver.finance_rate.as_decimal() <= dec!(-1)
            || self.solver.reinvestment_rate.as_decimal() <= dec!(-1)
        {
            return Err(CalculatorError::invalid_input(
                "solver.finance_rate",
                "MIRR rates must be above -100%",
            ));
        }
        Ok(())
    }
}
