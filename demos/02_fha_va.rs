/// FHA and VA purchase comparison
use fincalc_rs::{
    calculate_fha, calculate_va, FhaConfig, FhaInput, HousingCosts, Money, Rate, ScheduleLimits,
    VaInput,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let price = Money::from_major(400_000);
    let rate = Rate::from_percent(dec!(6.25));
    let costs = HousingCosts::new(
        Money::from_major(4_800),
        Money::from_major(1_800),
        Money::ZERO,
    );
    let limits = ScheduleLimits::default();

    let fha = calculate_fha(
        &FhaInput::new(price, Money::from_major(14_000), rate, 360).with_housing_costs(costs),
        &FhaConfig::default(),
        &limits,
    )?;
    println!("=== fha ===");
    println!("loan with upfront mip: ${} (ltv {})", fha.total_loan, fha.loan_to_value);
    println!("principal + interest:  ${}", fha.monthly_principal_interest);
    println!("first month mip:       ${}", fha.first_month_mip);
    println!("total monthly:         ${}", fha.total_monthly_payment);
    println!("mip over the loan:     ${}", fha.total_mip);

    let va = calculate_va(
        &VaInput::new(price, Money::ZERO, rate, 360).with_housing_costs(costs),
        &limits,
    )?;
    println!("\n=== va ===");
    println!("funding fee:           ${} ({})", va.funding_fee, va.funding_fee_rate);
    println!("principal + interest:  ${}", va.monthly_principal_interest);
    println!("total monthly:         ${}", va.total_monthly_payment);
    println!("total cost:            ${}", va.total_cost);

    Ok(())
}
