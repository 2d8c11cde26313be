use crate::layout::{GridSpec, sheet_count};
use crate::types::*;

/// Calculate sheet usage for a run of `page_count` pages
pub fn calculate_statistics(page_count: usize, grid: &GridSpec) -> BatchStatistics {
    let capacity = grid.capacity();
    let sheets = sheet_count(page_count, capacity);

    // Only the last sheet can be partial
    let slots_used_on_last_sheet = match (sheets, page_count % capacity.max(1)) {
        (0, _) => 0,
        (_, 0) => capacity,
        (_, remainder) => remainder,
    };

    BatchStatistics {
        pages: page_count,
        sheets,
        capacity,
        slots_used_on_last_sheet,
        empty_slots: sheets * capacity - page_count.min(sheets * capacity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ImpositionOptions;

    #[test]
    fn test_stats_no_pages() {
        let stats = calculate_statistics(0, &ImpositionOptions::default().grid());
        assert_eq!(stats.sheets, 0);
        assert_eq!(stats.slots_used_on_last_sheet, 0);
        assert_eq!(stats.empty_slots, 0);
    }

    #[test]
    fn test_stats_full_sheet() {
        let stats = calculate_statistics(10, &ImpositionOptions::default().grid());
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.sheets, 1);
        assert_eq!(stats.slots_used_on_last_sheet, 10);
        assert_eq!(stats.empty_slots, 0);
    }

    #[test]
    fn test_stats_partial_last_sheet() {
        let stats = calculate_statistics(12, &ImpositionOptions::default().grid());
        assert_eq!(stats.sheets, 2);
        assert_eq!(stats.slots_used_on_last_sheet, 2);
        assert_eq!(stats.empty_slots, 8);
    }
}
