//! XObject creation for imposition
//!
//! This module lifts source PDF pages into Form XObjects owned by the
//! output document, which are then drawn onto sheets with a transform.

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_PAGE_TREE_DEPTH};
use crate::layout::Rect;
use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::io;

/// Maps source object ids to their copies in the output document
pub type CopyCache = HashMap<ObjectId, ObjectId>;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject in `output` from a source page.
///
/// The XObject's BBox is the page's effective MediaBox and its resources are
/// deep-copied, so drawing it never needs the source document again. A page
/// `/Rotate` becomes the form's Matrix. `cache` must belong to `source`:
/// object ids are only meaningful per document.
///
/// Returns the XObject id and the page's bounding box as displayed, i.e.
/// after rotation.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut CopyCache,
) -> lopdf::Result<(ObjectId, Rect)> {
    let media_box = page_bounds(source, page_id)?;
    let rotation = page_rotation(source, page_id)?;
    let content_data = get_page_content(source, source.get_dictionary(page_id)?)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Real(media_box.x),
            Object::Real(media_box.y),
            Object::Real(media_box.right()),
            Object::Real(media_box.top()),
        ]),
    );

    let matrix = rotation_matrix(rotation);
    if rotation != 0 {
        xobject_dict.set(
            "Matrix",
            Object::Array(
                matrix
                    .iter()
                    .chain(&[0.0, 0.0])
                    .map(|&v| Object::Real(v))
                    .collect(),
            ),
        );
    }

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    let xobject_id = output.add_object(Stream::new(xobject_dict, content_data));
    Ok((xobject_id, rotated_bounds(&media_box, matrix)))
}

// =============================================================================
// Inherited Attributes
// =============================================================================

/// Look up a page attribute, walking up the page tree when the page itself
/// does not carry it (MediaBox and Resources are inheritable).
fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> lopdf::Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }

    Ok(None)
}

/// Follow a reference to the object it points at
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        _ => Ok(obj),
    }
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> lopdf::Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => resolve(doc, c)?,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Stream(stream) => stream_content(stream),
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> lopdf::Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Ok(stream) = resolve(doc, obj)?.as_stream() {
            result.extend_from_slice(&stream_content(stream)?);
            result.push(b'\n');
        }
    }

    Ok(result)
}

/// Decoded bytes of a content stream.
///
/// Fails on filters lopdf cannot decode and on damaged Flate data, which
/// lopdf itself would silently decode to nothing.
fn stream_content(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    if !stream.is_compressed() {
        return Ok(stream.content.clone());
    }

    let filters = stream.filters()?;
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }
    if filters[0] == b"FlateDecode" {
        check_flate(&stream.content)?;
    }

    stream.decompressed_content()
}

fn check_flate(data: &[u8]) -> lopdf::Result<()> {
    io::copy(&mut ZlibDecoder::new(data), &mut io::sink())
        .map_err(|e| lopdf::Error::InvalidStream(format!("damaged Flate data: {}", e)))?;
    Ok(())
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Referenced objects are copied once per cache. The output id is reserved
/// before the referenced object is copied, so reference cycles terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> lopdf::Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: lopdf::Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let new_dict = copy_dictionary(output, source, &stream.dict, cache)?;
            let mut copied = Stream::new(new_dict, stream.content.clone());
            copied.allows_compression = stream.allows_compression;
            Ok(Object::Stream(copied))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> lopdf::Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Get the effective MediaBox of a source page in points.
///
/// Falls back to US Letter when the page tree carries no usable MediaBox.
pub fn page_bounds(doc: &Document, page_id: ObjectId) -> lopdf::Result<Rect> {
    let default = Rect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1);

    let Some(media_box) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return Ok(default);
    };

    let corners: Option<Vec<f32>> = match resolve(doc, &media_box)?.as_array() {
        Ok(values) if values.len() == 4 => values.iter().map(extract_number).collect(),
        _ => None,
    };

    Ok(match corners.as_deref() {
        Some(&[llx, lly, urx, ury]) => Rect::from_corners(llx, lly, urx, ury),
        _ => default,
    })
}

/// Effective `/Rotate` of a source page in degrees, inherited like MediaBox
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> lopdf::Result<i64> {
    let rotation = match inherited_attribute(doc, page_id, b"Rotate")? {
        Some(value) => resolve(doc, &value)?.as_i64().unwrap_or(0),
        None => 0,
    };

    if rotation % 90 != 0 {
        log::warn!("Ignoring page rotation of {} degrees", rotation);
        return Ok(0);
    }
    Ok(rotation.rem_euclid(360))
}

/// Form matrix `[a b c d]` turning page space clockwise by `degrees`
fn rotation_matrix(degrees: i64) -> [f32; 4] {
    match degrees {
        90 => [0.0, -1.0, 1.0, 0.0],
        180 => [-1.0, 0.0, 0.0, -1.0],
        270 => [0.0, 1.0, -1.0, 0.0],
        _ => [1.0, 0.0, 0.0, 1.0],
    }
}

/// Bounding box of `rect` after applying a rotation matrix
fn rotated_bounds(rect: &Rect, [a, b, c, d]: [f32; 4]) -> Rect {
    let corners = [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.x, rect.top()),
        (rect.right(), rect.top()),
    ]
    .map(|(x, y)| (a * x + c * y, b * x + d * y));

    let (min_x, max_x) = corners
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let (min_y, max_y) = corners
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    Rect::from_corners(min_x, min_y, max_x, max_y)
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A two-level page tree where the page inherits MediaBox and Resources
    fn inherited_tree() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));

        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "F1",
                Object::Reference(font_id),
            )])),
        )]);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(241),
                        Object::Integer(156),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
            ])),
        );

        (doc, page_id)
    }

    /// A one-page document whose page carries `content` and `extra` entries
    fn single_page(content: Stream, extra: Vec<(&str, Object)>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(content);

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(156),
                    Object::Integer(241),
                ]),
            ),
        ]);
        for (key, value) in extra {
            page.set(key, value);
        }
        let page_id = doc.add_object(page);

        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
            ])),
        );
        (doc, page_id)
    }

    fn filtered_stream(filter: &str, data: Vec<u8>) -> Stream {
        Stream::new(
            Dictionary::from_iter(vec![("Filter", Object::Name(filter.as_bytes().to_vec()))]),
            data,
        )
    }

    #[test]
    fn test_inherited_media_box() {
        let (doc, page_id) = inherited_tree();
        let bounds = page_bounds(&doc, page_id).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 241.0, 156.0));
    }

    #[test]
    fn test_xobject_copies_inherited_resources() {
        let (source, page_id) = inherited_tree();
        let mut output = Document::with_version("1.7");
        let mut cache = CopyCache::new();

        let (xobject_id, bounds) =
            create_page_xobject(&mut output, &source, page_id, &mut cache).unwrap();
        assert_eq!(bounds.width, 241.0);

        let stream = output.get_object(xobject_id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, b"q Q".to_vec());

        let resources = stream.dict.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font_ref = fonts.get(b"F1").unwrap().as_reference().unwrap();
        let font = output.get_dictionary(font_ref).unwrap();
        assert_eq!(
            font.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica"
        );
    }

    #[test]
    fn test_shared_objects_copied_once() {
        let (source, page_id) = inherited_tree();
        let mut output = Document::with_version("1.7");
        let mut cache = CopyCache::new();

        create_page_xobject(&mut output, &source, page_id, &mut cache).unwrap();
        let after_first = output.objects.len();
        create_page_xobject(&mut output, &source, page_id, &mut cache).unwrap();

        // Only the second XObject stream is new; the font is reused
        assert_eq!(output.objects.len(), after_first + 1);
    }

    #[test]
    fn test_reference_cycle_terminates() {
        let mut source = Document::with_version("1.7");
        let a = source.new_object_id();
        let b = source.new_object_id();
        source.objects.insert(
            a,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(b))])),
        );
        source.objects.insert(
            b,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(a))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = CopyCache::new();
        copy_object_deep(&mut output, &source, &Object::Reference(a), &mut cache).unwrap();

        assert_eq!(output.objects.len(), 2);
    }

    #[test]
    fn test_flate_content_decoded() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"q Q").unwrap();
        let (source, page_id) =
            single_page(filtered_stream("FlateDecode", encoder.finish().unwrap()), vec![]);

        let mut output = Document::with_version("1.7");
        let (xobject_id, _) =
            create_page_xobject(&mut output, &source, page_id, &mut CopyCache::new()).unwrap();

        let stream = output.get_object(xobject_id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, b"q Q".to_vec());
        assert!(stream.dict.get(b"Filter").is_err());
    }

    #[test]
    fn test_undecodable_filter_rejected() {
        let (source, page_id) =
            single_page(filtered_stream("ASCIIHexDecode", b"712051>".to_vec()), vec![]);

        let mut output = Document::with_version("1.7");
        let result = create_page_xobject(&mut output, &source, page_id, &mut CopyCache::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_damaged_flate_rejected() {
        let (source, page_id) = single_page(
            filtered_stream("FlateDecode", b"definitely not zlib".to_vec()),
            vec![],
        );

        let mut output = Document::with_version("1.7");
        let result = create_page_xobject(&mut output, &source, page_id, &mut CopyCache::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_rotated_page_gets_matrix() {
        let content = Stream::new(Dictionary::new(), b"q Q".to_vec());
        let (source, page_id) = single_page(content, vec![("Rotate", Object::Integer(90))]);

        let mut output = Document::with_version("1.7");
        let (xobject_id, bounds) =
            create_page_xobject(&mut output, &source, page_id, &mut CopyCache::new()).unwrap();

        // A portrait 156x241 page turned a quarter displays as landscape
        assert_eq!(bounds, Rect::new(0.0, -156.0, 241.0, 156.0));

        let stream = output.get_object(xobject_id).unwrap().as_stream().unwrap();
        let matrix: Vec<f32> = stream
            .dict
            .get(b"Matrix")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(matrix, vec![0.0, -1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unrotated_page_has_no_matrix() {
        let (source, page_id) = inherited_tree();
        let mut output = Document::with_version("1.7");
        let (xobject_id, _) =
            create_page_xobject(&mut output, &source, page_id, &mut CopyCache::new()).unwrap();

        let stream = output.get_object(xobject_id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"Matrix").is_err());
    }

    #[test]
    fn test_page_rotation_inherited_and_normalised() {
        let (mut doc, page_id) = inherited_tree();
        let pages_id = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Parent")
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_dictionary_mut(pages_id)
            .unwrap()
            .set("Rotate", Object::Integer(-90));

        assert_eq!(page_rotation(&doc, page_id).unwrap(), 270);
        assert_eq!(
            rotated_bounds(&Rect::new(0.0, 0.0, 241.0, 156.0), rotation_matrix(180)),
            Rect::new(-241.0, -156.0, 241.0, 156.0)
        );
    }
}
