use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Write `value` as pretty JSON to `path`, replacing any existing file.
pub fn save_json<T: Serialize>(path: &Path, value: &T, items: usize) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    tracing::info!("Saved {} items to {}", items, path.display());
    Ok(())
}
