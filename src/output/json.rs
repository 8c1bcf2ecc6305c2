use super::OutputResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `report` as pretty-printed UTF-8 JSON
///
/// Non-ASCII titles are written as-is, not escaped. Missing parent
/// directories are created.
///
/// # Arguments
///
/// * `path` - Destination file, overwritten if it exists
/// * `report` - Any serializable report
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to create the file or serialize the report
pub fn write_json_report(path: &Path, report: &impl Serialize) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}
