use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::models::NameContext;

/// Load the curated name → context table from a JSON file shaped as
/// `{ "Emma": { "summary": "...", "events": [{"year": 2002, "label": "..."}] } }`.
/// Events are returned in ascending year order regardless of file order.
pub fn load_context_table(path: &Path) -> anyhow::Result<BTreeMap<String, NameContext>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading context table {}", path.display()))?;
    let mut table: BTreeMap<String, NameContext> =
        serde_json::from_str(&text).context("parsing context table JSON")?;

    for context in table.values_mut() {
        context.events.sort_by_key(|event| event.year);
    }

    Ok(table)
}
