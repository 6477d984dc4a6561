use flowdeck_core::cost;

pub fn run(depth: f64, rate: f64) -> Result<(), Box<dyn std::error::Error>> {
    let estimate = cost::estimate(depth, rate)?;
    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}
