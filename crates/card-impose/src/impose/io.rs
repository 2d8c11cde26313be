//! Document I/O operations for imposition

use super::report::MergedBatch;
use crate::types::*;
use std::path::{Path, PathBuf};

/// Read a PDF file into a batch item
pub async fn load_item(
    path: impl AsRef<Path>,
    id: impl Into<String>,
    label: impl Into<String>,
) -> Result<SourceItem> {
    let bytes = tokio::fs::read(path).await?;
    Ok(SourceItem::new(id, label, Some(bytes)))
}

/// Save the merged document
pub async fn save_batch(batch: &MergedBatch, path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path, &batch.bytes).await?;
    Ok(())
}

/// Save the merged document into `dir` under its suggested filename
pub async fn save_batch_in(batch: &MergedBatch, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(MergedBatch::default_filename());
    save_batch(batch, &path).await?;
    Ok(path)
}
