//! Layout calculation modules for imposition
//!
//! This module handles all the geometric calculations for card imposition:
//! - Grid validation (does the card grid fit on the sheet)
//! - Slot planning (which sheet, row and column each page goes to)
//! - Card placement (scaling a source page into its card box)

mod fit;
mod plan;
mod types;

pub use fit::*;
pub use plan::*;
pub use types::*;
