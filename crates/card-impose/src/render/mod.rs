//! PDF rendering modules for imposition
//!
//! This module handles all PDF-specific operations:
//! - Creating Form XObjects from source pages
//! - Deep copying PDF objects between documents
//! - Buffering sheets and writing the output page tree
//! - Generating printer's marks

mod document;
mod marks;
mod xobject;

pub use document::{PdfBackend, XObjectHandle};
pub use marks::generate_crop_marks;
pub use xobject::{CopyCache, copy_object_deep, create_page_xobject, page_bounds, page_rotation};
