use clap::Subcommand;

use flowdeck_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a single value by dotted key (e.g. tracker.idle_timeout_secs)
    Get { key: String },
    /// Set a value by dotted key
    Set { key: String, value: String },
    /// Print the full configuration
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let tree = toml::Value::try_from(&config)?;
            match lookup(&tree, &key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let config = Config::load()?;
            let mut tree = toml::Value::try_from(&config)?;
            let parsed = parse_value(&value);
            set(&mut tree, &key, parsed)?;
            // Round-trip through Config to reject nonsense shapes.
            let updated: Config = tree.try_into()?;
            updated.save()?;
            println!("{key} updated");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn lookup<'a>(tree: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(tree, |node, part| node.get(part))
}

fn set(
    tree: &mut toml::Value,
    key: &str,
    value: toml::Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut parts = key.split('.').peekable();
    let mut node = tree;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let table = node
                .as_table_mut()
                .ok_or_else(|| format!("'{key}' does not address a table entry"))?;
            if !table.contains_key(part) {
                return Err(format!("unknown key: {key}").into());
            }
            table.insert(part.to_string(), value);
            return Ok(());
        }
        node = node
            .get_mut(part)
            .ok_or_else(|| format!("unknown key: {key}"))?;
    }
    Err("empty key".into())
}

/// Parse a bare value as TOML; fall back to a string.
fn parse_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}
