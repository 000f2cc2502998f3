/// quick start - price a loan and print its schedule
use fincalc_rs::{compute_schedule, Money, Rate, ScheduleLimits};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // $1,000,000 over 20 years at 7.5%
    let result = compute_schedule(
        Money::from_major(1_000_000),
        Rate::from_percent(dec!(7.5)),
        240,
        &[],
        &ScheduleLimits::default(),
    )?;

    println!("monthly payment: ${}", result.regular_payment);
    println!("total interest:  ${}", result.total_interest);
    println!("total paid:      ${}", result.total_payment);

    for year in result.yearly_summary().iter().take(5) {
        println!(
            "year {:>2}: principal ${:>10} interest ${:>10} balance ${:>12}",
            year.year, year.principal, year.interest, year.closing_balance
        );
    }

    Ok(())
}
