//! Slot planning
//!
//! Maps a flat, ordered run of pages onto sheets. Pages are never
//! reordered: global index `i` goes to sheet `i / capacity`, filled
//! row-major from the top-left card box.

use crate::constants::GRID_FIT_TOLERANCE_PT;
use crate::types::{ImposeError, Result};

use super::{GridSpec, PlacementSlot};

// =============================================================================
// Planning
// =============================================================================

/// Plan placements for `page_count` pages.
///
/// Returns exactly `page_count` slots for any valid grid (an empty plan for
/// zero pages). The last sheet may be partial; its unused boxes are simply
/// absent. A grid with zero capacity yields no slots.
pub fn plan(page_count: usize, grid: &GridSpec) -> Vec<PlacementSlot> {
    if grid.capacity() == 0 {
        return Vec::new();
    }

    (0..page_count).map(|index| grid.slot(index)).collect()
}

/// Number of sheets needed for `page_count` pages
pub fn sheet_count(page_count: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    page_count.div_ceil(capacity)
}

impl GridSpec {
    /// Placement for the page at `index` in the flat page run.
    ///
    /// Callers must ensure `capacity() > 0`.
    pub fn slot(&self, index: usize) -> PlacementSlot {
        let capacity = self.capacity();
        let local = index % capacity;
        let row = local / self.cols;
        let col = local % self.cols;

        let x = self.margin_x + col as f32 * (self.card_width + self.gap_x);
        let y = self.sheet_height
            - self.margin_y
            - self.card_height
            - row as f32 * (self.card_height + self.gap_y);

        PlacementSlot {
            sheet_index: index / capacity,
            row,
            col,
            x,
            y,
            width: self.card_width,
            height: self.card_height,
        }
    }

    /// Reject grids that cannot be laid out on the sheet
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ImposeError::Config(
                "Grid needs at least one row and one column".to_string(),
            ));
        }

        if self.card_width <= 0.0 || self.card_height <= 0.0 {
            return Err(ImposeError::Config(
                "Card dimensions must be positive".to_string(),
            ));
        }

        if self.sheet_width <= 0.0 || self.sheet_height <= 0.0 {
            return Err(ImposeError::Config(
                "Sheet dimensions must be positive".to_string(),
            ));
        }

        if self.margin_x < 0.0 || self.margin_y < 0.0 || self.gap_x < 0.0 || self.gap_y < 0.0 {
            return Err(ImposeError::Config(
                "Margins and gaps must not be negative".to_string(),
            ));
        }

        let right = self.margin_x + self.used_width();
        if right > self.sheet_width + GRID_FIT_TOLERANCE_PT {
            return Err(ImposeError::Config(format!(
                "{} column(s) need {:.2}pt but the sheet is {:.2}pt wide",
                self.cols, right, self.sheet_width
            )));
        }

        let bottom = self.margin_y + self.used_height();
        if bottom > self.sheet_height + GRID_FIT_TOLERANCE_PT {
            return Err(ImposeError::Config(format!(
                "{} row(s) need {:.2}pt but the sheet is {:.2}pt tall",
                self.rows, bottom, self.sheet_height
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Integer-valued grid so coordinates compare exactly
    fn reference_grid() -> GridSpec {
        GridSpec {
            cols: 2,
            rows: 5,
            card_width: 240.0,
            card_height: 150.0,
            margin_x: 40.0,
            margin_y: 20.0,
            gap_x: 20.0,
            gap_y: 10.0,
            sheet_width: 600.0,
            sheet_height: 840.0,
        }
    }

    #[test]
    fn test_plan_empty() {
        assert!(plan(0, &reference_grid()).is_empty());
        assert_eq!(sheet_count(0, 10), 0);
    }

    #[test]
    fn test_plan_returns_one_slot_per_page() {
        let grid = reference_grid();
        for count in 0..=57 {
            assert_eq!(plan(count, &grid).len(), count);
        }
    }

    #[test]
    fn test_sheet_count_law() {
        let grid = reference_grid();
        for count in 1..=57 {
            let slots = plan(count, &grid);
            let sheets = slots.iter().map(|s| s.sheet_index).max().unwrap() + 1;
            assert_eq!(sheets, count.div_ceil(10));
            assert_eq!(sheets, sheet_count(count, grid.capacity()));
        }
    }

    #[test]
    fn test_row_major_fill() {
        let grid = reference_grid();
        for (k, slot) in plan(35, &grid).iter().enumerate() {
            assert_eq!(slot.sheet_index, k / 10);
            assert_eq!(slot.row, (k % 10) / 2);
            assert_eq!(slot.col, (k % 10) % 2);
            assert!(slot.row < grid.rows);
            assert!(slot.col < grid.cols);
        }
    }

    #[test]
    fn test_coordinates() {
        let grid = reference_grid();
        let slots = plan(10, &grid);

        // Top-left box
        assert_eq!(slots[0].x, 40.0);
        assert_eq!(slots[0].y, 840.0 - 20.0 - 150.0);

        // Top-right box
        assert_eq!(slots[1].x, 40.0 + 260.0);
        assert_eq!(slots[1].y, 670.0);

        // Bottom-right box
        assert_eq!(slots[9].x, 300.0);
        assert_eq!(slots[9].y, 670.0 - 4.0 * 160.0);

        assert!(slots.iter().all(|s| s.width == 240.0 && s.height == 150.0));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let grid = reference_grid();
        assert_eq!(plan(23, &grid), plan(23, &grid));
    }

    #[test]
    fn test_five_cards_fill_one_sheet() {
        let slots = plan(10, &reference_grid());

        assert!(slots.iter().all(|s| s.sheet_index == 0));
        assert_eq!((slots[0].row, slots[0].col), (0, 0));
        assert_eq!((slots[9].row, slots[9].col), (4, 1));
    }

    #[test]
    fn test_six_cards_spill_onto_second_sheet() {
        let slots = plan(12, &reference_grid());

        let second: Vec<_> = slots.iter().filter(|s| s.sheet_index == 1).collect();
        assert_eq!(second.len(), 2);
        assert_eq!((second[0].row, second[0].col), (0, 0));
        assert_eq!((second[1].row, second[1].col), (0, 1));
    }

    #[test]
    fn test_single_column_grid() {
        let grid = GridSpec {
            cols: 1,
            rows: 3,
            ..reference_grid()
        };
        let slots = plan(4, &grid);

        assert_eq!(slots[2].row, 2);
        assert_eq!(slots[3].sheet_index, 1);
        assert_eq!(slots[3].row, 0);
        assert!(slots.iter().all(|s| s.col == 0));
    }

    #[test]
    fn test_zero_capacity_plans_nothing() {
        let grid = GridSpec {
            rows: 0,
            ..reference_grid()
        };
        assert!(plan(5, &grid).is_empty());
        assert_eq!(sheet_count(5, 0), 0);
    }

    #[test]
    fn test_validate_accepts_reference_grid() {
        assert!(reference_grid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let wide = GridSpec {
            card_width: 300.0,
            ..reference_grid()
        };
        assert!(matches!(wide.validate(), Err(ImposeError::Config(_))));

        let tall = GridSpec {
            rows: 6,
            ..reference_grid()
        };
        assert!(matches!(tall.validate(), Err(ImposeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let no_cols = GridSpec {
            cols: 0,
            ..reference_grid()
        };
        assert!(no_cols.validate().is_err());

        let flat = GridSpec {
            card_height: 0.0,
            ..reference_grid()
        };
        assert!(flat.validate().is_err());

        let negative_gap = GridSpec {
            gap_x: -1.0,
            ..reference_grid()
        };
        assert!(negative_gap.validate().is_err());
    }
}
