//! Shared constants for card imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Card Grid
// =============================================================================

/// Card boxes per row
pub const DEFAULT_COLS: usize = 2;

/// Card box rows per sheet
pub const DEFAULT_ROWS: usize = 5;

/// Business card width (85mm x 55mm)
pub const DEFAULT_CARD_WIDTH_MM: f32 = 85.0;

/// Business card height
pub const DEFAULT_CARD_HEIGHT_MM: f32 = 55.0;

/// Left sheet margin; centers two cards and one gap on A4
pub const DEFAULT_MARGIN_X_MM: f32 = 15.0;

/// Top sheet margin; centers five cards on A4
pub const DEFAULT_MARGIN_Y_MM: f32 = 11.0;

/// Horizontal gap between adjacent card boxes
pub const DEFAULT_GAP_X_MM: f32 = 10.0;

/// Vertical gap between adjacent card boxes
pub const DEFAULT_GAP_Y_MM: f32 = 0.0;

/// Slack allowed when checking that the grid fits on the sheet (points)
pub const GRID_FIT_TOLERANCE_PT: f32 = 0.01;

// =============================================================================
// Source Pages
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Maximum depth followed when resolving inherited page attributes
pub const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Size difference (points) above which an exact placement is reported
pub const EXACT_SIZE_TOLERANCE_PT: f32 = 0.5;

// =============================================================================
// Printer's Marks
// =============================================================================

/// Line width for crop marks (points)
pub const CROP_MARK_WIDTH: f32 = 0.25;

/// Length of crop marks (points)
pub const CROP_MARK_LENGTH: f32 = 12.0;

/// Gap between crop mark and card edge (points)
pub const CROP_MARK_GAP: f32 = 3.0;

// =============================================================================
// Transport
// =============================================================================

/// MIME type of the merged document
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Prefix of the suggested download filename
pub const BATCH_FILENAME_PREFIX: &str = "impression-batch";
