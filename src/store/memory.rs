//! 内存文档存储
//!
//! 数据只保存在进程内。可以通过 `set_offline` 模拟存储不可用，
//! 此时所有读写都返回 `StoreError::Unavailable`。

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::{CHANGE_CHANNEL_CAPACITY, ChangeEvent, Collection, Document, DocumentStore, StoreError};

type DocKey = (String, Collection, String);

pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<DocKey, Document>>,
    changes: broadcast::Sender<ChangeEvent>,
    offline: AtomicBool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            docs: RwLock::new(BTreeMap::new()),
            changes,
            offline: AtomicBool::new(false),
        }
    }

    /// 切换模拟离线状态
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn notify(&self, user_id: &str, collection: Collection) {
        // 没有订阅者时发送会失败，忽略即可
        let _ = self.changes.send(ChangeEvent {
            user_id: user_id.to_string(),
            collection,
        });
    }
}

fn key(user_id: &str, collection: Collection, doc_id: &str) -> DocKey {
    (user_id.to_string(), collection, doc_id.to_string())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        Ok(self.docs.read().get(&key(user_id, collection, doc_id)).cloned())
    }

    async fn list(
        &self,
        user_id: &str,
        collection: Collection,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let docs = self.docs.read();
        Ok(docs
            .iter()
            .filter(|((uid, c, _), _)| uid == user_id && *c == collection)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn set(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
        body: Value,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let doc = Document {
            id: doc_id.to_string(),
            body,
            updated_at: chrono::Utc::now().timestamp(),
        };
        self.docs.write().insert(key(user_id, collection, doc_id), doc);
        self.notify(user_id, collection);
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let removed = self.docs.write().remove(&key(user_id, collection, doc_id));
        if removed.is_some() {
            self.notify(user_id, collection);
        }
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
