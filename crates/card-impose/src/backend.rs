//! Document backend seam
//!
//! Everything that touches a concrete document library goes through
//! [`DocumentBackend`]. The planner and the batch orchestration only see
//! page counts, opaque handles and rectangles.

use crate::layout::{Rect, Transform};
use crate::types::{ItemError, PageRole, Result};

/// Narrow interface over a page-document library.
///
/// One backend value owns one output document. Sources are decoded
/// independently (and may be decoded on other threads) before being
/// embedded into the output one at a time.
pub trait DocumentBackend {
    /// A decoded source document
    type Source: Send + 'static;
    /// An embedded page, valid only within this backend's output document
    type Handle: Clone + std::fmt::Debug;

    /// Parse raw document bytes
    fn load_document(bytes: &[u8]) -> std::result::Result<Self::Source, ItemError>;

    /// Number of pages in a decoded source
    fn page_count(source: &Self::Source) -> usize;

    /// Copy the given pages of `source` into the output document.
    ///
    /// Handles come back in the order of `indices`. On failure the output
    /// document must be left as it was before the call.
    fn embed_pages(
        &mut self,
        source: &Self::Source,
        indices: &[usize],
    ) -> std::result::Result<Vec<Self::Handle>, ItemError>;

    /// Intrinsic bounding box of an embedded page
    fn page_bounds(&self, handle: &Self::Handle) -> Rect;

    /// Append a blank output page and return its index
    fn create_page(&mut self, width: f32, height: f32) -> usize;

    /// Draw an embedded page onto output page `page`
    fn draw_embedded_page(
        &mut self,
        page: usize,
        handle: &Self::Handle,
        transform: &Transform,
    ) -> Result<()>;

    /// Draw trim marks around a card box on output page `page`
    fn draw_crop_marks(&mut self, page: usize, card: &Rect) -> Result<()>;

    /// Number of output pages created so far
    fn output_page_count(&self) -> usize;

    /// Finalize the output document into bytes
    fn serialize(self) -> Result<Vec<u8>>;
}

/// A source page registered in the output document
#[derive(Debug, Clone)]
pub struct EmbeddedPage<H> {
    pub source_item_id: String,
    /// 0-based index within the source document
    pub page_index: usize,
    pub role: PageRole,
    pub handle: H,
}
