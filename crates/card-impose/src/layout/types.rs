//! Layout data types for imposition
//!
//! These types carry plain geometry between the planner and the
//! compositor. Nothing here knows about PDF objects.

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from PDF box corners `[llx lly urx ury]`, normalising swapped corners
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self::new(
            llx.min(urx),
            lly.min(ury),
            (urx - llx).abs(),
            (ury - lly).abs(),
        )
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Fixed card grid for one deployment, in points.
///
/// Row 0 is the top row; sheet coordinates have their origin at the
/// bottom-left corner with y increasing upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Card boxes per row
    pub cols: usize,
    /// Rows of card boxes per sheet
    pub rows: usize,
    pub card_width: f32,
    pub card_height: f32,
    /// Distance from the sheet's left edge to the first column
    pub margin_x: f32,
    /// Distance from the sheet's top edge to the first row
    pub margin_y: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    pub sheet_width: f32,
    pub sheet_height: f32,
}

impl GridSpec {
    /// Card boxes per sheet
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Width covered by all columns, gaps included
    pub fn used_width(&self) -> f32 {
        self.cols as f32 * self.card_width + self.cols.saturating_sub(1) as f32 * self.gap_x
    }

    /// Height covered by all rows, gaps included
    pub fn used_height(&self) -> f32 {
        self.rows as f32 * self.card_height + self.rows.saturating_sub(1) as f32 * self.gap_y
    }
}

/// Where one embedded page lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSlot {
    /// Output sheet (0-based)
    pub sheet_index: usize,
    /// Row within the sheet (0 = top)
    pub row: usize,
    /// Column within the sheet (0 = left)
    pub col: usize,
    /// Lower-left corner of the card box
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlacementSlot {
    /// The card box as a rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Scale-and-translate matrix `[sx 0 0 sy tx ty]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Transform {
    /// Size of `source` once this transform is applied
    pub fn scaled_size(&self, source: &Rect) -> (f32, f32) {
        (source.width * self.scale_x, source.height * self.scale_y)
    }
}
