//! JSON persistence for pin files and raw snapshots.
//!
//! Pin files live at `data/<list_id>.json` in the served shape
//! `{"pins": [...]}`; snapshots at `data/raw/<list_id>_raw.json` keep the
//! reference records around for later reconciliation runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{PinFile, Snapshot};

pub fn pins_path(data_dir: &Path, list_id: u32) -> PathBuf {
    data_dir.join(format!("{list_id}.json"))
}

pub fn snapshot_path(data_dir: &Path, list_id: u32) -> PathBuf {
    data_dir.join("raw").join(format!("{list_id}_raw.json"))
}

pub fn neis_snapshot_path(data_dir: &Path, kind_name: &str) -> PathBuf {
    data_dir.join("raw").join(format!("neis_{kind_name}.json"))
}

pub fn load_pins(path: &Path) -> Result<PinFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pin file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Malformed pin file {}", path.display()))
}

pub fn save_pins(path: &Path, pins: &PinFile) -> Result<()> {
    write_pretty(path, pins)
}

pub fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Snapshot<T>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Malformed snapshot {}", path.display()))
}

pub fn save_snapshot<T: Serialize + Clone>(path: &Path, records: &[T]) -> Result<()> {
    write_pretty(path, &Snapshot::now(records))
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
