//! Batch input parsing: a JSON array, or one JSON object per line.

use color_eyre::eyre::{Result, eyre};
use serde_json::Value;

use leadenrich_shared::EnrichmentRecord;

/// Parse batch input into normalized records.
pub(crate) fn parse_records(text: &str) -> Result<Vec<EnrichmentRecord>> {
    let trimmed = text.trim_start();
    let values: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| eyre!("invalid JSON array: {e}"))?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| eyre!("line {}: invalid JSON: {e}", i + 1))
            })
            .collect::<Result<_>>()?
    };

    Ok(values.iter().map(EnrichmentRecord::normalize).collect())
}
