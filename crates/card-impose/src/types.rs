use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Batch-level failures, surfaced to the caller.
#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Batch contains no items")]
    EmptyBatch,
    #[error("No embeddable pages: {} item(s) skipped", .failures.len())]
    NoEmbeddablePages { failures: Vec<ItemFailure> },
    #[error("Composition failed: {0}")]
    Compose(String),
    #[error("Output document has no sheets to serialize")]
    NothingToSerialize,
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Per-item failures. These never abort a batch; the item is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("no document bytes supplied")]
    MissingBytes,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
    #[error("unreadable document: {0}")]
    Decode(String),
    #[error("document has no pages")]
    NoPages,
    #[error("page extraction failed: {0}")]
    Extract(String),
}

/// A skipped item and the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item_id: String,
    pub label: String,
    pub error: ItemError,
}

/// Document content as handed over by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw PDF bytes
    Pdf(Vec<u8>),
    /// Base64 text as stored by the order system
    Base64(String),
}

impl Payload {
    /// Strip the transport encoding, yielding the document bytes.
    pub fn to_bytes(&self) -> std::result::Result<Cow<'_, [u8]>, ItemError> {
        match self {
            Payload::Pdf(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            Payload::Base64(text) => STANDARD
                .decode(text.trim())
                .map(Cow::Owned)
                .map_err(|e| ItemError::Base64(e.to_string())),
        }
    }
}

/// One card or order in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Opaque identifier
    pub id: String,
    /// Human-readable tag, only used for diagnostics
    pub label: String,
    /// Document content; `None` means the item is skipped
    pub payload: Option<Payload>,
}

impl SourceItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, pdf: Option<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            payload: pdf.map(Payload::Pdf),
        }
    }

    /// Build an item from a base64-encoded blob. Decoding is deferred so a bad
    /// payload only skips this item.
    pub fn from_base64(
        id: impl Into<String>,
        label: impl Into<String>,
        encoded: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            payload: encoded.map(Payload::Base64),
        }
    }
}

/// Descriptive role of a page within its card document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    Front,
    Back,
    Other,
}

impl PageRole {
    pub fn for_index(index: usize) -> Self {
        match index {
            0 => PageRole::Front,
            1 => PageRole::Back,
            _ => PageRole::Other,
        }
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// How a source page is fitted into its card box when the sizes differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectPolicy {
    /// Scale each axis independently to fill the box exactly
    #[default]
    Stretch,
    /// Uniform scale, centered, aspect ratio preserved
    Fit,
    /// No scaling; the page is anchored at the box's lower-left corner
    AssumeExact,
}

/// Statistics about a planned batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStatistics {
    /// Total number of embedded pages
    pub pages: usize,
    /// Number of output sheets
    pub sheets: usize,
    /// Card boxes per sheet
    pub capacity: usize,
    /// Card boxes filled on the final sheet
    pub slots_used_on_last_sheet: usize,
    /// Unfilled card boxes across the run (all on the final sheet)
    pub empty_slots: usize,
}
