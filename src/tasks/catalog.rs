//! Content catalog service.
//!
//! Owns the collection state behind the [`ContentRequest`] boundary. A
//! collection directory holds `scene_*.json` documents, each listing page
//! assets; the catalog serves paths and positions only, never pixel data.
//! Errors cross the boundary as strings so the presentation side stays
//! decoupled from how loading fails.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::content::{CollectionEntry, CollectionInfo, ContentRequest, ItemData};

const COLLECTION_FILE_PREFIX: &str = "scene_";
const COLLECTION_FILE_SUFFIX: &str = ".json";
const COLLECTION_DIR_PREFIX: &str = "scenes-";
const PREVIEW_DIR: &str = "thumbnail";

/// On-disk collection document. The format is external; unknown fields are
/// ignored and only what the catalog serves is declared.
#[derive(Debug, Deserialize)]
struct CollectionDoc {
    metadata: CollectionMeta,
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionMeta {
    scene_name: String,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    image: PathBuf,
}

#[derive(Debug)]
struct LoadedCollection {
    index: usize,
    name: String,
    pages: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    files: Vec<PathBuf>,
    current: Option<LoadedCollection>,
    item_index: usize,
    loop_enabled: bool,
}

impl Catalog {
    /// Scans `dir` for collection documents, sorted by file name, and
    /// activates the first one at its first item.
    pub fn load(&mut self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("read collection directory {}", dir.display()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_collection_file(path))
            .collect();
        files.sort();
        ensure!(
            !files.is_empty(),
            "no collection files under {}",
            dir.display()
        );
        self.files = files;
        self.current = None;
        self.item_index = 0;
        self.activate(0)?;
        Ok(self.files.len())
    }

    /// Loads the collection at `index` unless it is already current.
    fn activate(&mut self, index: usize) -> Result<()> {
        ensure!(!self.files.is_empty(), "no collection loaded");
        ensure!(
            index < self.files.len(),
            "collection index {index} out of range ({} available)",
            self.files.len()
        );
        if self.current.as_ref().is_some_and(|c| c.index == index) {
            return Ok(());
        }
        let path = &self.files[index];
        let text = fs::read_to_string(path)
            .with_context(|| format!("read collection {}", path.display()))?;
        let doc: CollectionDoc = serde_json::from_str(&text)
            .with_context(|| format!("parse collection {}", path.display()))?;
        ensure!(
            !doc.pages.is_empty(),
            "collection {} has no pages",
            doc.metadata.scene_name
        );
        let dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let pages = doc
            .pages
            .into_iter()
            .map(|page| {
                if page.image.is_absolute() {
                    page.image
                } else {
                    dir.join(page.image)
                }
            })
            .collect();
        debug!(index, name = %doc.metadata.scene_name, "collection activated");
        self.current = Some(LoadedCollection {
            index,
            name: doc.metadata.scene_name,
            pages,
        });
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedCollection> {
        self.current.as_ref().context("no collection loaded")
    }

    pub fn info(&self) -> Result<CollectionInfo> {
        let loaded = self.loaded()?;
        Ok(CollectionInfo {
            name: loaded.name.clone(),
            index: loaded.index,
            total_items: loaded.pages.len(),
            current_item: self.item_index,
        })
    }

    /// Fetches one item, optionally switching collections first, and moves
    /// the cursor there.
    pub fn item(&mut self, collection: Option<usize>, item: usize) -> Result<ItemData> {
        if let Some(index) = collection {
            self.activate(index)?;
            // The switch may have carried a cursor from a longer collection;
            // keep it in range even if the item check below fails.
            if self.item_index >= self.loaded()?.pages.len() {
                self.item_index = 0;
            }
        }
        let total = self.loaded()?.pages.len();
        ensure!(item < total, "item {item} out of range ({total} available)");
        self.item_index = item;
        self.item_data()
    }

    pub fn advance_item(&mut self) -> Result<ItemData> {
        let (index, total) = {
            let loaded = self.loaded()?;
            (loaded.index, loaded.pages.len())
        };
        if self.loop_enabled {
            self.item_index = (self.item_index + 1) % total;
        } else if self.item_index + 1 < total {
            self.item_index += 1;
        } else {
            // Past the last item: cross into the next collection.
            let next = (index + 1) % self.files.len();
            self.activate(next)?;
            self.item_index = 0;
        }
        self.item_data()
    }

    pub fn retreat_item(&mut self) -> Result<ItemData> {
        let (index, total) = {
            let loaded = self.loaded()?;
            (loaded.index, loaded.pages.len())
        };
        if self.loop_enabled {
            self.item_index = if self.item_index == 0 {
                total - 1
            } else {
                self.item_index - 1
            };
        } else if self.item_index > 0 {
            self.item_index -= 1;
        } else {
            // Before the first item: land on the previous collection's last.
            let previous = if index == 0 {
                self.files.len() - 1
            } else {
                index - 1
            };
            self.activate(previous)?;
            self.item_index = self.loaded()?.pages.len() - 1;
        }
        self.item_data()
    }

    pub fn advance_collection(&mut self) -> Result<CollectionInfo> {
        let index = self.loaded()?.index;
        let next = (index + 1) % self.files.len();
        self.activate(next)?;
        self.item_index = 0;
        self.info()
    }

    pub fn retreat_collection(&mut self) -> Result<CollectionInfo> {
        let index = self.loaded()?.index;
        let previous = if index == 0 {
            self.files.len() - 1
        } else {
            index - 1
        };
        self.activate(previous)?;
        self.item_index = 0;
        self.info()
    }

    pub fn loop_flag(&self) -> bool {
        self.loop_enabled
    }

    pub fn set_loop_flag(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    fn item_data(&self) -> Result<ItemData> {
        let loaded = self.loaded()?;
        let asset_path = loaded.pages[self.item_index].clone();
        let main_asset = asset_path.exists().then(|| asset_path.clone());
        let preview_asset = Some(preview_path(&asset_path)).filter(|path| path.exists());
        if main_asset.is_none() {
            warn!(path = %asset_path.display(), "main asset missing on disk");
        }
        Ok(ItemData {
            is_preview: main_asset.is_none() && preview_asset.is_some(),
            main_asset,
            preview_asset,
            item_index: self.item_index,
            collection_index: loaded.index,
            asset_path,
        })
    }

    fn handle(&mut self, request: ContentRequest) {
        match request {
            ContentRequest::LoadCollection { path, reply } => {
                let result = self.load(&path);
                match &result {
                    Ok(count) => {
                        info!(collections = count, path = %path.display(), "collection directory loaded");
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "collection load failed");
                    }
                }
                let _ = reply.send(result.map_err(stringify));
            }
            ContentRequest::CollectionInfo { reply } => {
                let _ = reply.send(self.info().map_err(stringify));
            }
            ContentRequest::Item {
                collection,
                item,
                reply,
            } => {
                let _ = reply.send(self.item(collection, item).map_err(stringify));
            }
            ContentRequest::AdvanceItem { reply } => {
                let _ = reply.send(self.advance_item().map_err(stringify));
            }
            ContentRequest::RetreatItem { reply } => {
                let _ = reply.send(self.retreat_item().map_err(stringify));
            }
            ContentRequest::AdvanceCollection { reply } => {
                let _ = reply.send(self.advance_collection().map_err(stringify));
            }
            ContentRequest::RetreatCollection { reply } => {
                let _ = reply.send(self.retreat_collection().map_err(stringify));
            }
            ContentRequest::LoopFlag { reply } => {
                let _ = reply.send(Ok(self.loop_flag()));
            }
            ContentRequest::SetLoopFlag { enabled, reply } => {
                self.set_loop_flag(enabled);
                debug!(enabled, "loop flag set");
                let _ = reply.send(Ok(()));
            }
            ContentRequest::ListCollections { parent, reply } => {
                let _ = reply.send(find_collections(&parent).map_err(stringify));
            }
        }
    }
}

/// Lists collection directories under `parent`: child directories whose
/// name carries the collection prefix and that hold at least one collection
/// document, sorted by name. A prefix-named directory without documents
/// would only fail later on load, so it is not offered.
pub fn find_collections(parent: &Path) -> Result<Vec<CollectionEntry>> {
    let entries =
        fs::read_dir(parent).with_context(|| format!("read {}", parent.display()))?;
    let mut found: Vec<CollectionEntry> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && has_collection_file(path))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            name.starts_with(COLLECTION_DIR_PREFIX)
                .then(|| CollectionEntry {
                    name: name.to_string(),
                    path: path.clone(),
                })
        })
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// Preview assets live next to the main asset in a `thumbnail/` directory
/// under the same file name.
fn preview_path(asset: &Path) -> PathBuf {
    match (asset.parent(), asset.file_name()) {
        (Some(parent), Some(name)) => parent.join(PREVIEW_DIR).join(name),
        _ => asset.to_path_buf(),
    }
}

fn has_collection_file(dir: &Path) -> bool {
    fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .any(|entry| is_collection_file(&entry.path()))
}

fn is_collection_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.starts_with(COLLECTION_FILE_PREFIX) && name.ends_with(COLLECTION_FILE_SUFFIX)
            })
}

fn stringify(err: anyhow::Error) -> String {
    format!("{err:#}")
}

/// Runs the catalog service until shutdown or until every handle is gone.
pub async fn run(
    mut requests: mpsc::Receiver<ContentRequest>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut catalog = Catalog::default();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            request = requests.recv() => {
                let Some(request) = request else { break };
                catalog.handle(request);
            }
        }
    }
    info!("content catalog stopped");
    Ok(())
}
