//! lopdf-backed output document
//!
//! [`PdfBackend`] owns the output document while a batch is imposed.
//! Sheets are buffered (content operators plus XObject resources) and only
//! written as page objects when the document is serialized.

use super::marks::generate_crop_marks;
use super::xobject::{CopyCache, create_page_xobject};
use crate::backend::DocumentBackend;
use crate::codec::{DecodedDocument, decode};
use crate::layout::{Rect, Transform};
use crate::types::{ImposeError, ItemError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Handle to a source page embedded as a Form XObject
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XObjectHandle {
    pub id: ObjectId,
    /// The source page's MediaBox
    pub bounds: Rect,
}

/// One output sheet awaiting serialization
#[derive(Debug)]
struct SheetBuffer {
    width: f32,
    height: f32,
    content: String,
    xobjects: Dictionary,
    xobject_count: usize,
}

/// Output document built with lopdf
pub struct PdfBackend {
    doc: Document,
    pages_tree_id: ObjectId,
    sheets: Vec<SheetBuffer>,
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_tree_id = doc.new_object_id();
        Self {
            doc,
            pages_tree_id,
            sheets: Vec::new(),
        }
    }

    /// Number of objects currently in the output document
    pub fn object_count(&self) -> usize {
        self.doc.objects.len()
    }

    fn sheet_mut(&mut self, page: usize) -> Result<&mut SheetBuffer> {
        self.sheets
            .get_mut(page)
            .ok_or_else(|| ImposeError::Compose(format!("Output page {} does not exist", page)))
    }

    /// Drop every object allocated after `checkpoint`
    fn rollback(&mut self, checkpoint: u32) {
        self.doc.objects.retain(|&(number, _), _| number <= checkpoint);
        self.doc.max_id = checkpoint;
    }

    fn embed_all(
        &mut self,
        source: &DecodedDocument,
        indices: &[usize],
    ) -> std::result::Result<Vec<XObjectHandle>, ItemError> {
        let mut cache = CopyCache::new();

        indices
            .iter()
            .map(|&index| {
                let page_id = source.page_ids.get(index).copied().ok_or_else(|| {
                    ItemError::Extract(format!(
                        "page {} out of range ({} pages)",
                        index,
                        source.page_count()
                    ))
                })?;

                let (id, bounds) =
                    create_page_xobject(&mut self.doc, &source.doc, page_id, &mut cache)
                        .map_err(|e| ItemError::Extract(e.to_string()))?;
                Ok(XObjectHandle { id, bounds })
            })
            .collect()
    }

    /// Write buffered sheets as page objects under the page tree
    fn write_pages(&mut self) -> Vec<Object> {
        let sheets = std::mem::take(&mut self.sheets);
        let mut page_refs = Vec::with_capacity(sheets.len());

        for sheet in sheets {
            let content_id = self.doc.add_object(Stream::new(
                Dictionary::new(),
                sheet.content.into_bytes(),
            ));

            let mut resources = Dictionary::new();
            resources.set("XObject", Object::Dictionary(sheet.xobjects));

            let page_id = self.doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(self.pages_tree_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(sheet.width),
                        Object::Real(sheet.height),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            page_refs.push(Object::Reference(page_id));
        }

        page_refs
    }
}

impl DocumentBackend for PdfBackend {
    type Source = DecodedDocument;
    type Handle = XObjectHandle;

    fn load_document(bytes: &[u8]) -> std::result::Result<DecodedDocument, ItemError> {
        decode(bytes)
    }

    fn page_count(source: &DecodedDocument) -> usize {
        source.page_count()
    }

    fn embed_pages(
        &mut self,
        source: &DecodedDocument,
        indices: &[usize],
    ) -> std::result::Result<Vec<XObjectHandle>, ItemError> {
        let checkpoint = self.doc.max_id;

        let result = self.embed_all(source, indices);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    fn page_bounds(&self, handle: &XObjectHandle) -> Rect {
        handle.bounds
    }

    fn create_page(&mut self, width: f32, height: f32) -> usize {
        self.sheets.push(SheetBuffer {
            width,
            height,
            content: String::new(),
            xobjects: Dictionary::new(),
            xobject_count: 0,
        });
        self.sheets.len() - 1
    }

    fn draw_embedded_page(
        &mut self,
        page: usize,
        handle: &XObjectHandle,
        transform: &Transform,
    ) -> Result<()> {
        let sheet = self.sheet_mut(page)?;

        let name = format!("P{}", sheet.xobject_count);
        sheet.xobject_count += 1;
        sheet
            .xobjects
            .set(name.as_bytes(), Object::Reference(handle.id));

        sheet.content.push_str(&format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            transform.scale_x, transform.scale_y, transform.translate_x, transform.translate_y, name
        ));
        Ok(())
    }

    fn draw_crop_marks(&mut self, page: usize, card: &Rect) -> Result<()> {
        let sheet = self.sheet_mut(page)?;
        sheet.content.push_str(&generate_crop_marks(card));
        Ok(())
    }

    fn output_page_count(&self) -> usize {
        self.sheets.len()
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return Err(ImposeError::NothingToSerialize);
        }

        let page_refs = self.write_pages();

        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        let mut writer = Vec::new();
        self.doc
            .save_to(&mut writer)
            .map_err(|e| ImposeError::Serialize(e.to_string()))?;
        Ok(writer)
    }
}
