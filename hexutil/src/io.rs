use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn to_json<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(obj)?)
}

/// Writes pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, obj: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    fs_err::write(path, to_json(obj)?)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let contents = fs_err::read_to_string(path)?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}
