//! Sheet composition

use crate::backend::{DocumentBackend, EmbeddedPage};
use crate::constants::EXACT_SIZE_TOLERANCE_PT;
use crate::layout::{PlacementSlot, card_transform, matches_card};
use crate::options::ImpositionOptions;
use crate::types::*;
use std::collections::BTreeMap;

/// Draw every embedded page into its planned card box.
///
/// `pages` and `placements` must correspond index for index. One output
/// sheet is created per distinct sheet index, in increasing index order.
pub fn compose<B: DocumentBackend>(
    backend: &mut B,
    pages: &[EmbeddedPage<B::Handle>],
    placements: &[PlacementSlot],
    options: &ImpositionOptions,
) -> Result<()> {
    if pages.len() != placements.len() {
        return Err(ImposeError::Compose(format!(
            "{} page(s) but {} placement(s)",
            pages.len(),
            placements.len()
        )));
    }

    let (sheet_width, sheet_height) = options.sheet_dimensions_pt();

    let mut sheets: BTreeMap<usize, usize> = placements
        .iter()
        .map(|slot| (slot.sheet_index, 0))
        .collect();
    for output_page in sheets.values_mut() {
        *output_page = backend.create_page(sheet_width, sheet_height);
    }

    for (page, slot) in pages.iter().zip(placements) {
        let output_page = sheets[&slot.sheet_index];
        let card = slot.rect();
        let source = backend.page_bounds(&page.handle);

        if options.aspect_policy == AspectPolicy::AssumeExact
            && !matches_card(&card, &source, EXACT_SIZE_TOLERANCE_PT)
        {
            log::warn!(
                "Page {} of item {} is {:.1}x{:.1}pt, card box is {:.1}x{:.1}pt; placing unscaled",
                page.page_index + 1,
                page.source_item_id,
                source.width,
                source.height,
                card.width,
                card.height
            );
        }

        let transform = card_transform(&card, &source, options.aspect_policy);
        backend.draw_embedded_page(output_page, &page.handle, &transform)?;

        if options.crop_marks {
            backend.draw_crop_marks(output_page, &card)?;
        }
    }

    log::debug!("Composed {} page(s) onto {} sheet(s)", pages.len(), sheets.len());
    Ok(())
}
