//! Batch results and transport framing

use crate::constants::{BATCH_FILENAME_PREFIX, PDF_CONTENT_TYPE};
use crate::types::{BatchStatistics, ItemFailure};
use chrono::{Local, NaiveDate};

/// An item that made it into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedItem {
    pub item_id: String,
    pub label: String,
    pub pages: usize,
}

/// What happened to each item of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Embedded items, in caller order
    pub embedded: Vec<EmbeddedItem>,
    /// Skipped items, in caller order
    pub failures: Vec<ItemFailure>,
    pub statistics: BatchStatistics,
}

/// The print-ready document and its report
#[derive(Debug, Clone)]
pub struct MergedBatch {
    pub bytes: Vec<u8>,
    pub report: BatchReport,
}

impl MergedBatch {
    /// MIME type for transport
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    /// `impression-batch-<ISO date>.pdf`
    pub fn suggested_filename(date: NaiveDate) -> String {
        format!("{}-{}.pdf", BATCH_FILENAME_PREFIX, date.format("%Y-%m-%d"))
    }

    /// Suggested filename for today's local date
    pub fn default_filename() -> String {
        Self::suggested_filename(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            MergedBatch::suggested_filename(date),
            "impression-batch-2024-03-07.pdf"
        );
    }
}
