/// project returns - irr, npv curve, payback
use fincalc_rs::{npv_sensitivity, solve_irr, Money, Rate, SolverConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let flows: Vec<Money> = [-50_000, 12_000, 15_000, 18_000, 20_000]
        .iter()
        .map(|v| Money::from_major(*v))
        .collect();

    let result = solve_irr(&flows, &SolverConfig::default())?;
    if !result.converged {
        println!("warning: irr is an approximation");
    }
    println!("irr:     {}", result.irr);
    if let Some(mirr) = result.mirr {
        println!("mirr:    {mirr}");
    }
    match result.payback_period {
        Some(period) => println!("payback: {} periods", period.round_dp(2)),
        None => println!("payback: not recovered"),
    }

    println!("\nnpv curve:");
    for point in npv_sensitivity(&flows, Rate::ZERO, Rate::from_percentage(30), 6)? {
        println!("{:>6} {:>12}", point.rate.to_string(), point.npv.round_cents().to_string());
    }

    println!("\n{}", result.to_json()?);
    Ok(())
}
