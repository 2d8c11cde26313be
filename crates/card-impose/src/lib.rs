pub mod backend;
pub mod codec;
pub mod constants;
pub mod impose;
pub mod layout;
mod options;
pub mod render;
mod stats;
mod types;

pub use backend::{DocumentBackend, EmbeddedPage};
pub use codec::{DecodedDocument, decode};
pub use impose::{
    BatchReport, EmbeddedItem, MergedBatch, compose, impose_batch, impose_batch_blocking,
    impose_with, load_item, save_batch, save_batch_in,
};
pub use layout::{GridSpec, PlacementSlot, Rect, Transform, plan, sheet_count};
pub use options::*;
pub use render::{PdfBackend, XObjectHandle};
pub use stats::calculate_statistics;
pub use types::*;
