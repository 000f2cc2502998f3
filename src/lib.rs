pub mod cashflows;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod loans;
pub mod payments;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{CalculatorError, Result};
pub use config::{CalculatorConfig, FhaConfig, ScheduleLimits, SolverConfig};
pub use events::{EventTimeline, ScheduleEvent};
pub use interest::{calculate_loan_term, calculate_monthly_payment, minimum_viable_payment};
pub use payments::{
    compare_prepayment_savings, compute_schedule, generate_payment_amortization, solve_for_payment,
    solve_for_term, AmortizationRequest, AmortizationRow, PaymentMode, PaymentResult,
    PrepaymentSavings, YearSummary,
};
pub use loans::{
    calculate_fha, calculate_va, va_funding_fee_rate, FhaInput, FhaResult, HousingCosts,
    OverlayRow, VaInput, VaResult,
};
pub use cashflows::{
    cash_flow_table, discounted_payback_period, mirr, npv, npv_sensitivity, payback_period,
    solve_irr, CashFlowItem, IrrResult, SensitivityPoint,
};
pub use types::{
    ExtraPayment, ExtraPaymentKind, Prepayment, PrepaymentFrequency, PrepaymentMode, RateChange,
    VaLoanPurpose,
};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
