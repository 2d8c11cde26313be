//! Card imposition - arranging a batch of card documents onto print sheets
//!
//! This module orchestrates the imposition process:
//! 1. Decode every item's document independently
//! 2. Embed the pages of each readable item into one output document
//! 3. Plan card-box placements for the flat page run
//! 4. Compose the sheets and serialize

mod compose;
mod io;
mod report;

pub use compose::compose;
pub use io::{load_item, save_batch, save_batch_in};
pub use report::{BatchReport, EmbeddedItem, MergedBatch};

use crate::backend::{DocumentBackend, EmbeddedPage};
use crate::layout::plan;
use crate::options::ImpositionOptions;
use crate::render::PdfBackend;
use crate::stats::calculate_statistics;
use crate::types::*;

/// Identity of an item, carried through the fold for reporting
#[derive(Debug, Clone)]
struct ItemKey {
    id: String,
    label: String,
}

impl From<&SourceItem> for ItemKey {
    fn from(item: &SourceItem) -> Self {
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
        }
    }
}

type Decoded<S> = (ItemKey, std::result::Result<S, ItemError>);

/// Impose a batch onto print sheets.
///
/// Items are decoded in parallel on blocking tasks; embedding, composition
/// and serialization then run on a single blocking task because they all
/// mutate the one output document.
pub async fn impose_batch(
    items: Vec<SourceItem>,
    options: &ImpositionOptions,
) -> Result<MergedBatch> {
    check_batch(&items, options)?;

    let decoded = decode_all(items, decode_item::<PdfBackend>).await;

    let options = options.clone();
    tokio::task::spawn_blocking(move || assemble(PdfBackend::new(), decoded, &options)).await?
}

/// Impose a batch on the current thread
pub fn impose_batch_blocking(
    items: &[SourceItem],
    options: &ImpositionOptions,
) -> Result<MergedBatch> {
    impose_with(PdfBackend::new(), items, options)
}

/// Impose a batch with an arbitrary document backend
pub fn impose_with<B: DocumentBackend>(
    backend: B,
    items: &[SourceItem],
    options: &ImpositionOptions,
) -> Result<MergedBatch> {
    check_batch(items, options)?;

    let decoded = items
        .iter()
        .map(|item| (ItemKey::from(item), decode_item::<B>(item.payload.as_ref())))
        .collect();

    assemble(backend, decoded, options)
}

/// Decode every item on its own blocking task, keeping caller order.
///
/// A task that dies (a panic inside the decoder) only fails its own item.
async fn decode_all<S, F>(items: Vec<SourceItem>, decode: F) -> Vec<Decoded<S>>
where
    S: Send + 'static,
    F: Fn(Option<&Payload>) -> std::result::Result<S, ItemError> + Copy + Send + 'static,
{
    let tasks: Vec<_> = items
        .into_iter()
        .map(|item| {
            let key = ItemKey {
                id: item.id,
                label: item.label,
            };
            let payload = item.payload;
            let task = tokio::task::spawn_blocking(move || decode(payload.as_ref()));
            (key, task)
        })
        .collect();

    let mut decoded = Vec::with_capacity(tasks.len());
    for (key, task) in tasks {
        let result = task
            .await
            .unwrap_or_else(|e| Err(ItemError::Decode(format!("decoder task failed: {}", e))));
        decoded.push((key, result));
    }
    decoded
}

fn check_batch(items: &[SourceItem], options: &ImpositionOptions) -> Result<()> {
    options.validate()?;

    if items.is_empty() {
        return Err(ImposeError::EmptyBatch);
    }

    log::info!("Imposing batch of {} item(s)", items.len());
    Ok(())
}

fn decode_item<B: DocumentBackend>(
    payload: Option<&Payload>,
) -> std::result::Result<B::Source, ItemError> {
    let bytes = payload.ok_or(ItemError::MissingBytes)?.to_bytes()?;
    let source = B::load_document(&bytes)?;

    if B::page_count(&source) == 0 {
        return Err(ItemError::NoPages);
    }
    Ok(source)
}

/// Pages and per-item outcomes gathered while embedding
struct Collected<H> {
    pages: Vec<EmbeddedPage<H>>,
    embedded: Vec<EmbeddedItem>,
    failures: Vec<ItemFailure>,
}

impl<H> Collected<H> {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            embedded: Vec::new(),
            failures: Vec::new(),
        }
    }
}

fn assemble<B: DocumentBackend>(
    mut backend: B,
    decoded: Vec<Decoded<B::Source>>,
    options: &ImpositionOptions,
) -> Result<MergedBatch> {
    let collected = decoded
        .into_iter()
        .fold(Collected::new(), |mut acc, (key, decoded)| {
            match decoded.and_then(|source| embed_item(&mut backend, &key.id, &source)) {
                Ok(pages) => {
                    log::debug!(
                        "Embedded {} page(s) from item {} ({})",
                        pages.len(),
                        key.id,
                        key.label
                    );
                    acc.embedded.push(EmbeddedItem {
                        item_id: key.id,
                        label: key.label,
                        pages: pages.len(),
                    });
                    acc.pages.extend(pages);
                }
                Err(error) => {
                    log::warn!("Skipping item {} ({}): {}", key.id, key.label, error);
                    acc.failures.push(ItemFailure {
                        item_id: key.id,
                        label: key.label,
                        error,
                    });
                }
            }
            acc
        });

    let Collected {
        pages,
        embedded,
        failures,
    } = collected;

    if pages.is_empty() {
        return Err(ImposeError::NoEmbeddablePages { failures });
    }

    let grid = options.grid();
    let placements = plan(pages.len(), &grid);
    compose(&mut backend, &pages, &placements, options)?;

    let statistics = calculate_statistics(pages.len(), &grid);
    let bytes = backend.serialize()?;

    log::info!(
        "Imposed {} page(s) from {} item(s) onto {} sheet(s), {} item(s) skipped",
        statistics.pages,
        embedded.len(),
        statistics.sheets,
        failures.len()
    );

    Ok(MergedBatch {
        bytes,
        report: BatchReport {
            embedded,
            failures,
            statistics,
        },
    })
}

fn embed_item<B: DocumentBackend>(
    backend: &mut B,
    item_id: &str,
    source: &B::Source,
) -> std::result::Result<Vec<EmbeddedPage<B::Handle>>, ItemError> {
    let indices: Vec<usize> = (0..B::page_count(source)).collect();
    let handles = backend.embed_pages(source, &indices)?;

    if handles.len() != indices.len() {
        return Err(ItemError::Extract(format!(
            "expected {} page(s), backend returned {}",
            indices.len(),
            handles.len()
        )));
    }

    Ok(indices
        .into_iter()
        .zip(handles)
        .map(|(page_index, handle)| EmbeddedPage {
            source_item_id: item_id.to_string(),
            page_index,
            role: PageRole::for_index(page_index),
            handle,
        })
        .collect())
}
