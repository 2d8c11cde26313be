use crate::constants::*;
use crate::layout::GridSpec;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Imposition configuration for one deployment.
///
/// Lengths are in millimeters; [`ImpositionOptions::grid`] converts them
/// to the point-based geometry the planner works with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpositionOptions {
    // Output sheet
    pub sheet_size: PaperSize,
    pub orientation: Orientation,

    // Card grid
    pub rows: usize,
    pub cols: usize,
    pub card_width_mm: f32,
    pub card_height_mm: f32,

    // Spacing
    pub margin_x_mm: f32,
    pub margin_y_mm: f32,
    pub gap_x_mm: f32,
    pub gap_y_mm: f32,

    // Rendering
    pub aspect_policy: AspectPolicy,
    pub crop_marks: bool,
}

impl Default for ImpositionOptions {
    fn default() -> Self {
        Self {
            sheet_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            card_width_mm: DEFAULT_CARD_WIDTH_MM,
            card_height_mm: DEFAULT_CARD_HEIGHT_MM,
            margin_x_mm: DEFAULT_MARGIN_X_MM,
            margin_y_mm: DEFAULT_MARGIN_Y_MM,
            gap_x_mm: DEFAULT_GAP_X_MM,
            gap_y_mm: DEFAULT_GAP_Y_MM,
            aspect_policy: AspectPolicy::default(),
            crop_marks: false,
        }
    }
}

impl ImpositionOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Sheet size in points, orientation applied
    pub fn sheet_dimensions_pt(&self) -> (f32, f32) {
        let (width_mm, height_mm) = self.sheet_size.dimensions_with_orientation(self.orientation);
        (mm_to_pt(width_mm), mm_to_pt(height_mm))
    }

    /// Point-based grid geometry for the planner
    pub fn grid(&self) -> GridSpec {
        let (sheet_width, sheet_height) = self.sheet_dimensions_pt();
        GridSpec {
            cols: self.cols,
            rows: self.rows,
            card_width: mm_to_pt(self.card_width_mm),
            card_height: mm_to_pt(self.card_height_mm),
            margin_x: mm_to_pt(self.margin_x_mm),
            margin_y: mm_to_pt(self.margin_y_mm),
            gap_x: mm_to_pt(self.gap_x_mm),
            gap_y: mm_to_pt(self.gap_y_mm),
            sheet_width,
            sheet_height,
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.grid().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_ten_up_a4() {
        let options = ImpositionOptions::default();
        let grid = options.grid();

        assert_eq!(grid.capacity(), 10);
        assert!((grid.sheet_width - 595.28).abs() < 0.01);
        assert!((grid.sheet_height - 841.89).abs() < 0.01);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_landscape_swaps_sheet() {
        let options = ImpositionOptions {
            orientation: Orientation::Landscape,
            ..Default::default()
        };
        let (w, h) = options.sheet_dimensions_pt();
        assert!(w > h);
        // Five 55mm rows no longer fit on a 210mm-tall sheet
        assert!(options.validate().is_err());
    }
}
