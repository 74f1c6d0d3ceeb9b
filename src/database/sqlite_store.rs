//! 基于 SeaORM / SQLite 的文档存储

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::database::repository::documents_repository::DocumentsRepository;
use crate::entity::documents;
use crate::store::{
    CHANGE_CHANNEL_CAPACITY, ChangeEvent, Collection, Document, DocumentStore, StoreError,
};

pub struct SqliteDocumentStore {
    db: DatabaseConnection,
    changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, changes }
    }

    /// 集合内文档数量
    pub async fn count(&self, user_id: &str, collection: Collection) -> Result<u64, StoreError> {
        Ok(DocumentsRepository::count_in_collection(&self.db, user_id, collection.as_str()).await?)
    }

    fn notify(&self, user_id: &str, collection: Collection) {
        let _ = self.changes.send(ChangeEvent {
            user_id: user_id.to_string(),
            collection,
        });
    }
}

fn to_document(collection: Collection, model: documents::Model) -> Result<Document, StoreError> {
    let body = serde_json::from_str(&model.body).map_err(|source| StoreError::Decode {
        collection,
        id: model.doc_id.clone(),
        source,
    })?;
    Ok(Document {
        id: model.doc_id,
        body,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        DocumentsRepository::find(&self.db, user_id, collection.as_str(), doc_id)
            .await?
            .map(|model| to_document(collection, model))
            .transpose()
    }

    async fn list(
        &self,
        user_id: &str,
        collection: Collection,
    ) -> Result<Vec<Document>, StoreError> {
        let models =
            DocumentsRepository::find_all_in_collection(&self.db, user_id, collection.as_str())
                .await?;

        // 单条文档损坏不影响整个集合的读取
        Ok(models
            .into_iter()
            .filter_map(|model| match to_document(collection, model) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    log::warn!("跳过损坏的文档: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn set(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
        body: Value,
    ) -> Result<(), StoreError> {
        let text = serde_json::to_string(&body).map_err(StoreError::Encode)?;
        DocumentsRepository::upsert(&self.db, user_id, collection.as_str(), doc_id, text).await?;
        log::debug!("写入文档 {}/{}/{}", user_id, collection, doc_id);
        self.notify(user_id, collection);
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<(), StoreError> {
        let rows = DocumentsRepository::delete(&self.db, user_id, collection.as_str(), doc_id).await?;
        if rows > 0 {
            log::debug!("删除文档 {}/{}/{}", user_id, collection, doc_id);
            self.notify(user_id, collection);
        }
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{connect_in_memory, run_migrations};
    use crate::domain::{Game, Rating};
    use crate::store::UserDocuments;
    use serde_json::json;

    async fn store() -> SqliteDocumentStore {
        let conn = connect_in_memory().await.unwrap();
        run_migrations(&conn).await.unwrap();
        SqliteDocumentStore::new(conn)
    }

    fn game(id: u64, title: &str) -> Game {
        Game {
            id,
            title: title.to_string(),
            image_url: None,
            description: "No description available".to_string(),
            rating: 4.0,
            platforms: vec!["PC".to_string()],
            genre: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_lists_sorted() {
        let store = store().await;
        store
            .set("u1", Collection::Library, "20", json!({"v": 1}))
            .await
            .unwrap();
        store
            .set("u1", Collection::Library, "10", json!({"v": 1}))
            .await
            .unwrap();
        store
            .set("u1", Collection::Library, "20", json!({"v": 2}))
            .await
            .unwrap();

        let docs = store.list("u1", Collection::Library).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20"]);
        assert_eq!(docs[1].body, json!({"v": 2}));
        assert_eq!(store.count("u1", Collection::Library).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_ok() {
        let store = store().await;
        store.delete("u1", Collection::Favorites, "1").await.unwrap();
        assert!(store.get("u1", Collection::Favorites, "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_typed_access_keeps_rating_independent() {
        let store = store().await;
        let docs = UserDocuments::new(&store, "u1");

        docs.put_game(Collection::Library, &game(3498, "GTA V"))
            .await
            .unwrap();
        docs.set_rating(58175, Rating::new(4.5).unwrap()).await.unwrap();

        assert!(docs.contains(Collection::Library, 3498).await.unwrap());
        assert!(!docs.contains(Collection::Library, 58175).await.unwrap());
        assert_eq!(docs.rating(58175).await.unwrap().map(|r| r.value()), Some(4.5));
        assert_eq!(docs.rating(3498).await.unwrap(), None);

        let games = docs.games(Collection::Library).await.unwrap();
        assert_eq!(games, vec![game(3498, "GTA V")]);
    }

    #[tokio::test]
    async fn test_changes_are_broadcast() {
        let store = store().await;
        let mut rx = store.changes();
        store
            .set("u1", Collection::Ratings, "1", json!({"rating": 3}))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.collection, Collection::Ratings);
    }
}
