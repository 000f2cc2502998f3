pub mod amortization;
pub mod prepayment;

pub use amortization::{compute_schedule, AmortizationRow, PaymentResult, YearSummary};
pub use prepayment::{
    compare_prepayment_savings, generate_payment_amortization, period_date, solve_for_payment,
    solve_for_term, AmortizationRequest, PaymentMode, PrepaymentSavings,
};
