//! Document codec
//!
//! Turns document bytes into a parsed PDF. Malformed input is reported
//! as an [`ItemError`]; the caller decides whether to skip the item.

use crate::types::ItemError;
use lopdf::{Document, ObjectId};

/// A parsed source document
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    pub(crate) doc: Document,
    pub(crate) page_ids: Vec<ObjectId>,
}

impl DecodedDocument {
    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// The underlying lopdf document
    pub fn document(&self) -> &Document {
        &self.doc
    }
}

impl From<Document> for DecodedDocument {
    fn from(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, so values come out in page order
        let page_ids = doc.get_pages().into_values().collect();
        Self { doc, page_ids }
    }
}

/// Parse raw PDF bytes
pub fn decode(bytes: &[u8]) -> Result<DecodedDocument, ItemError> {
    if bytes.is_empty() {
        return Err(ItemError::Decode("empty document".to_string()));
    }

    let doc = Document::load_mem(bytes).map_err(|e| ItemError::Decode(e.to_string()))?;
    Ok(DecodedDocument::from(doc))
}
