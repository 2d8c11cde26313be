//! Card placement
//!
//! Computes the transform that draws a source page into a card box under
//! a given [`AspectPolicy`].

use crate::types::AspectPolicy;

use super::{Rect, Transform};

/// Transform mapping the source page box onto the card box.
///
/// `source` is the page's own bounding box in its coordinate space, which
/// need not start at the origin. Degenerate (zero-sized) sources are drawn
/// unscaled.
pub fn card_transform(card: &Rect, source: &Rect, policy: AspectPolicy) -> Transform {
    let stretch_x = axis_scale(card.width, source.width);
    let stretch_y = axis_scale(card.height, source.height);

    let (scale_x, scale_y) = match policy {
        AspectPolicy::Stretch => (stretch_x, stretch_y),
        AspectPolicy::Fit => {
            let uniform = stretch_x.min(stretch_y);
            (uniform, uniform)
        }
        AspectPolicy::AssumeExact => (1.0, 1.0),
    };

    // Fit centers inside the box; the other policies anchor at the lower-left
    let (offset_x, offset_y) = match policy {
        AspectPolicy::Fit => (
            (card.width - source.width * scale_x) / 2.0,
            (card.height - source.height * scale_y) / 2.0,
        ),
        AspectPolicy::Stretch | AspectPolicy::AssumeExact => (0.0, 0.0),
    };

    Transform {
        scale_x,
        scale_y,
        translate_x: card.x + offset_x - source.x * scale_x,
        translate_y: card.y + offset_y - source.y * scale_y,
    }
}

/// Whether a source page already matches the card box within `tolerance`
pub fn matches_card(card: &Rect, source: &Rect, tolerance: f32) -> bool {
    (card.width - source.width).abs() <= tolerance
        && (card.height - source.height).abs() <= tolerance
}

fn axis_scale(target: f32, source: f32) -> f32 {
    if source > 0.0 { target / source } else { 1.0 }
}
