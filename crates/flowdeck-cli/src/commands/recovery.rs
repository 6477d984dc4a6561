use flowdeck_core::recovery_path;

pub fn run(depth: f64) -> Result<(), Box<dyn std::error::Error>> {
    let path = recovery_path(depth)?;
    println!("{}", serde_json::to_string_pretty(&path)?);
    Ok(())
}
