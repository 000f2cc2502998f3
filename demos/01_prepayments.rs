/// prepayments and rate changes on a dated schedule
use fincalc_rs::chrono::NaiveDate;
use fincalc_rs::{
    compare_prepayment_savings, generate_payment_amortization, AmortizationRequest, Money,
    Prepayment, PrepaymentMode, Rate, RateChange, ScheduleLimits,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== prepayment example ===\n");

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("bad start date")?;
    let limits = ScheduleLimits::default();

    let request = AmortizationRequest::fixed_term(
        Money::from_major(300_000),
        Rate::from_percent(dec!(6.5)),
        360,
        start,
    )
    // yearly bonus goes to principal
    .with_prepayment(Prepayment::annually(
        NaiveDate::from_ymd_opt(2025, 12, 1).ok_or("bad date")?,
        Money::from_major(5_000),
        PrepaymentMode::ReduceTenure,
    ))
    // a one-off windfall lowers the installment instead
    .with_prepayment(Prepayment::one_time(
        NaiveDate::from_ymd_opt(2027, 6, 1).ok_or("bad date")?,
        Money::from_major(30_000),
        PrepaymentMode::ReduceEmi,
    ))
    .with_rate_change(RateChange::new(
        NaiveDate::from_ymd_opt(2029, 1, 1).ok_or("bad date")?,
        Rate::from_percent(dec!(7.25)),
    ));

    let schedule = generate_payment_amortization(&request, &limits)?;
    println!("initial payment: ${}", schedule.regular_payment);
    println!("paid off after {} months", schedule.term_months);
    if let Some(last) = schedule.final_payment_date() {
        println!("final payment:   {last}");
    }

    let savings = compare_prepayment_savings(&request, &limits)?;
    println!("\ninterest saved:  ${}", savings.interest_saved);
    println!("months saved:    {}", savings.periods_saved);
    println!("final payment:   ${}", savings.final_regular_payment);

    Ok(())
}
