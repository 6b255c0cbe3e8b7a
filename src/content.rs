//! Boundary between the presentation layer and the content catalog.
//!
//! The controller only ever talks to content through [`ContentHandle`];
//! requests cross a channel and come back on oneshot replies. Failures
//! arrive as opaque strings from the service side and are wrapped in
//! [`ContentError`] here.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error)]
pub enum ContentError {
    /// The catalog task is gone: the request channel is closed or the reply
    /// was dropped.
    #[error("content service unavailable")]
    Disconnected,
    /// The catalog reported a failure for this operation.
    #[error("{0}")]
    Backend(String),
}

/// Position and shape of the collection currently being presented.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub index: usize,
    pub total_items: usize,
    pub current_item: usize,
}

/// One presentable item. Asset fields are paths; the presentation layer
/// treats them as opaque and only reads the indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    pub main_asset: Option<PathBuf>,
    pub preview_asset: Option<PathBuf>,
    pub item_index: usize,
    pub collection_index: usize,
    pub asset_path: PathBuf,
    /// True when only the preview asset resolved on disk.
    pub is_preview: bool,
}

/// A collection directory discovered under a parent path.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub name: String,
    pub path: PathBuf,
}

type Reply<T> = oneshot::Sender<Result<T, String>>;

#[derive(Debug)]
pub enum ContentRequest {
    LoadCollection { path: PathBuf, reply: Reply<usize> },
    CollectionInfo { reply: Reply<CollectionInfo> },
    Item {
        collection: Option<usize>,
        item: usize,
        reply: Reply<ItemData>,
    },
    AdvanceItem { reply: Reply<ItemData> },
    RetreatItem { reply: Reply<ItemData> },
    AdvanceCollection { reply: Reply<CollectionInfo> },
    RetreatCollection { reply: Reply<CollectionInfo> },
    LoopFlag { reply: Reply<bool> },
    SetLoopFlag { enabled: bool, reply: Reply<()> },
    ListCollections {
        parent: PathBuf,
        reply: Reply<Vec<CollectionEntry>>,
    },
}

#[derive(Debug, Clone)]
pub struct ContentHandle {
    tx: mpsc::Sender<ContentRequest>,
}

impl ContentHandle {
    pub fn new(tx: mpsc::Sender<ContentRequest>) -> Self {
        Self { tx }
    }

    async fn call<T>(
        &self,
        request: ContentRequest,
        rx: oneshot::Receiver<Result<T, String>>,
    ) -> Result<T, ContentError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| ContentError::Disconnected)?;
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(ContentError::Backend(message)),
            Err(_) => Err(ContentError::Disconnected),
        }
    }

    /// Loads a collection directory; resolves to the number of collections
    /// found there.
    pub async fn load_collection(&self, path: PathBuf) -> Result<usize, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::LoadCollection { path, reply }, rx)
            .await
    }

    pub async fn collection_info(&self) -> Result<CollectionInfo, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::CollectionInfo { reply }, rx).await
    }

    /// Fetches a specific item, optionally switching collections first.
    pub async fn item(
        &self,
        collection: Option<usize>,
        item: usize,
    ) -> Result<ItemData, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            ContentRequest::Item {
                collection,
                item,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn advance_item(&self) -> Result<ItemData, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::AdvanceItem { reply }, rx).await
    }

    pub async fn retreat_item(&self) -> Result<ItemData, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::RetreatItem { reply }, rx).await
    }

    pub async fn advance_collection(&self) -> Result<CollectionInfo, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::AdvanceCollection { reply }, rx)
            .await
    }

    pub async fn retreat_collection(&self) -> Result<CollectionInfo, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::RetreatCollection { reply }, rx)
            .await
    }

    pub async fn loop_flag(&self) -> Result<bool, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::LoopFlag { reply }, rx).await
    }

    pub async fn set_loop_flag(&self, enabled: bool) -> Result<(), ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::SetLoopFlag { enabled, reply }, rx)
            .await
    }

    pub async fn list_collections(
        &self,
        parent: PathBuf,
    ) -> Result<Vec<CollectionEntry>, ContentError> {
        let (reply, rx) = oneshot::channel();
        self.call(ContentRequest::ListCollections { parent, reply }, rx)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_disconnected_when_service_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ContentHandle::new(tx);
        assert!(matches!(
            handle.loop_flag().await,
            Err(ContentError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn reports_disconnected_when_reply_is_dropped() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ContentHandle::new(tx);
        let service = tokio::spawn(async move {
            // Drop the request, and with it the reply sender.
            let _ = rx.recv().await;
        });
        assert!(matches!(
            handle.collection_info().await,
            Err(ContentError::Disconnected)
        ));
        let _ = service.await;
    }

    #[tokio::test]
    async fn backend_errors_carry_the_message() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ContentHandle::new(tx);
        let service = tokio::spawn(async move {
            if let Some(ContentRequest::AdvanceItem { reply }) = rx.recv().await {
                let _ = reply.send(Err("no collection loaded".to_string()));
            }
        });
        match handle.advance_item().await {
            Err(ContentError::Backend(message)) => {
                assert_eq!(message, "no collection loaded");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let _ = service.await;
    }
}
