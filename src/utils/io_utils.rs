use crate::utils::Result;
use serde::Serialize;
use std::{fs::File, io::BufWriter};

pub fn create_writer<T, F>(output_prefix: &str, output_suffix: &str, f: F) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    let output_path = format!("{}.{}", output_prefix, output_suffix);
    f(&output_path)
}

/// Serializes `value` as pretty-printed JSON into `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| format!("Failed to create {}: {}", path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| format!("Failed to write {}: {}", path, e))?;
    std::io::Write::write_all(&mut writer, b"\n").map_err(|e| e.to_string())?;
    std::io::Write::flush(&mut writer).map_err(|e| format!("Failed to flush {}: {}", path, e))
}
