use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("payment too low: {payment} does not cover interest, minimum viable payment is {minimum}")]
    PaymentTooLow {
        payment: Money,
        minimum: Money,
    },

    #[error("schedule did not terminate after {periods} periods: remaining balance {remaining_balance}")]
    ScheduleDidNotTerminate {
        periods: u32,
        remaining_balance: Money,
    },

    #[error("negative amortization in period {period}: payment {payment} does not cover interest {interest}")]
    NegativeAmortization {
        period: u32,
        payment: Money,
        interest: Money,
    },

    #[error("cash flows have no sign change, internal rate of return is undefined")]
    NoSignChange,

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CalculatorError {
    pub(crate) fn invalid_input(field: &str, reason: &str) -> Self {
        CalculatorError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        CalculatorError::CalculationError {
            message: format!("decimal overflow in {context}"),
        }
    }
}

impl From<serde_json::Error> for CalculatorError {
    fn from(e: serde_json::Error) -> Self {
        CalculatorError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
