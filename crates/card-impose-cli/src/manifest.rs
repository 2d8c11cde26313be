//! Batch manifests: the JSON form of a list of card items.
//!
//! ```json
//! [
//!   { "id": "1042", "label": "Bakery Rossi", "pdf_base64": "JVBERi0..." },
//!   { "id": "1043", "label": "no file yet" }
//! ]
//! ```

use anyhow::{Context, Result};
use card_impose::SourceItem;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub pdf_base64: Option<String>,
}

impl From<ManifestEntry> for SourceItem {
    fn from(entry: ManifestEntry) -> Self {
        SourceItem::from_base64(entry.id, entry.label, entry.pdf_base64)
    }
}

pub fn parse(json: &[u8]) -> Result<Vec<SourceItem>> {
    let entries: Vec<ManifestEntry> =
        serde_json::from_slice(json).context("Manifest must be a JSON array of items")?;
    Ok(entries.into_iter().map(SourceItem::from).collect())
}

pub async fn load(path: &Path) -> Result<Vec<SourceItem>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    parse(&bytes).with_context(|| format!("Invalid manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_impose::Payload;

    #[test]
    fn test_parse_manifest() {
        let items = parse(
            br#"[
                {"id": "1", "label": "first", "pdf_base64": "JVBERi0xLjc="},
                {"id": "2"}
            ]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "first");
        assert_eq!(
            items[0].payload,
            Some(Payload::Base64("JVBERi0xLjc=".to_string()))
        );
        assert_eq!(items[1].label, "");
        assert!(items[1].payload.is_none());
    }

    #[test]
    fn test_parse_rejects_object() {
        assert!(parse(br#"{"id": "1"}"#).is_err());
    }
}
