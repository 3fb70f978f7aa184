//! Events command for dumping stored events as JSONL.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use pulse_core::OwnerId;
use pulse_db::Database;

/// Runs the events command, outputting events as JSONL to stdout.
pub fn run(db: &Database, owner: &str, since: Option<&str>) -> Result<()> {
    let owner = OwnerId::new(owner)?;
    let since = parse_timestamp(since)?;

    let events = match since {
        Some(since) => db.events_since(&owner, since)?,
        None => db.list_events(&owner)?,
    };

    for event in events {
        let json = serde_json::to_string(&event)?;
        println!("{json}");
    }

    Ok(())
}

fn parse_timestamp(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match s {
        None => Ok(None),
        Some(s) => {
            let dt = DateTime::parse_from_rfc3339(s).context(
                "invalid --since timestamp, expected ISO 8601 (e.g., 2025-06-01T12:00:00Z)",
            )?;
            Ok(Some(dt.with_timezone(&Utc)))
        }
    }
}
