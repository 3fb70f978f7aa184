//! Record command for appending one usage event.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use pulse_db::Database;

/// Runs the record command, printing the stored event as JSON.
pub fn run(
    db: &mut Database,
    owner: &str,
    name: &str,
    value: Option<f64>,
    category: Option<String>,
    meta: &[String],
) -> Result<()> {
    let metadata = parse_meta(meta)?;
    let record = pulse_core::record_event(db, owner, name, value, category, metadata)?;
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}

fn parse_meta(entries: &[String]) -> Result<Map<String, Value>> {
    let mut metadata = Map::new();
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid --meta entry {entry:?}, expected key=value");
        };
        metadata.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(metadata)
}
