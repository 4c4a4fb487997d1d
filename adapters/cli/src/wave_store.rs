//! File-backed wave catalogue in the backing-store format.

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use curve_defence_core::WaveDefinition;
use serde::Deserialize;

/// On-disk shape of a catalogue: a single `waves` array.
#[derive(Debug, Deserialize)]
struct CatalogueFile {
    waves: Vec<WaveDefinition>,
}

/// Reads a wave catalogue file and returns its waves in play order.
pub(crate) fn load(path: &Path) -> anyhow::Result<Vec<WaveDefinition>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading wave catalogue {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing wave catalogue {}", path.display()))
}

fn parse(raw: &str) -> anyhow::Result<Vec<WaveDefinition>> {
    let file: CatalogueFile = serde_json::from_str(raw)?;
    Ok(file.waves)
}
