//! Printer's marks rendering for imposed sheets
//!
//! Generates PDF content stream operations for crop marks around each
//! card box, so the sheet can be guillotined after printing.

use crate::constants::{CROP_MARK_GAP, CROP_MARK_LENGTH, CROP_MARK_WIDTH};
use crate::layout::Rect;

/// Generate L-shaped crop marks just outside the four corners of a card box
pub fn generate_crop_marks(card: &Rect) -> String {
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str("0 0 0 RG\n");
    ops.push_str(&format!("{} w\n", CROP_MARK_WIDTH));
    ops.push_str("[] 0 d\n"); // solid line

    let corners = [
        (card.x, card.top(), -1.0, 1.0),
        (card.right(), card.top(), 1.0, 1.0),
        (card.x, card.y, -1.0, -1.0),
        (card.right(), card.y, 1.0, -1.0),
    ];

    for (x, y, dx, dy) in corners {
        // Vertical arm, continuing the card's side edge away from the card
        ops.push_str(&line(
            x,
            y + dy * CROP_MARK_GAP,
            x,
            y + dy * (CROP_MARK_GAP + CROP_MARK_LENGTH),
        ));
        // Horizontal arm
        ops.push_str(&line(
            x + dx * CROP_MARK_GAP,
            y,
            x + dx * (CROP_MARK_GAP + CROP_MARK_LENGTH),
            y,
        ));
    }

    ops.push_str("Q\n");
    ops
}

fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> String {
    format!("{} {} m {} {} l S\n", x1, y1, x2, y2)
}
