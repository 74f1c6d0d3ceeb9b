//! 用户文档存储
//!
//! 每个用户拥有三个扁平集合：`library`、`favorites`、`ratings`，
//! 集合内以游戏 ID 字符串为 key。写入只有整体覆盖（set）和删除（delete），
//! 没有部分更新，也没有跨文档事务，后写覆盖先写。

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{Game, GameId, Rating, RatingDoc};

pub use memory::MemoryDocumentStore;

/// 变更通知通道容量
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// 用户集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Library,
    Favorites,
    Ratings,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Library => "library",
            Collection::Favorites => "favorites",
            Collection::Ratings => "ratings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "library" => Ok(Collection::Library),
            "favorites" => Ok(Collection::Favorites),
            "ratings" => Ok(Collection::Ratings),
            other => Err(StoreError::UnknownCollection(other.to_string())),
        }
    }
}

/// 存储中的一条文档
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
    /// 最后写入时间（Unix 秒）
    pub updated_at: i64,
}

/// 集合变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub user_id: String,
    pub collection: Collection,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("document store is unavailable")]
    Unavailable,

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed document {collection}/{id}: {source}")]
    Decode {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 按 key 读取单条文档
    async fn get(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// 读取整个集合，按 key 排序
    async fn list(&self, user_id: &str, collection: Collection)
    -> Result<Vec<Document>, StoreError>;

    /// 整体覆盖写入
    async fn set(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
        body: Value,
    ) -> Result<(), StoreError>;

    /// 按 key 删除，文档不存在时视为成功
    async fn delete(&self, user_id: &str, collection: Collection, doc_id: &str)
    -> Result<(), StoreError>;

    /// 订阅所有集合的变更通知
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// 集合的实时订阅
///
/// 第一次 `next` 返回当前快照，此后每次集合发生变更时返回新的快照。
/// `next` 可以在 `tokio::select!` 中安全取消：未返回的快照会在下次调用时重新读取。
pub struct Subscription {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    collection: Collection,
    changes: broadcast::Receiver<ChangeEvent>,
    stale: bool,
}

impl Subscription {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str, collection: Collection) -> Self {
        // 先订阅再读取快照，避免丢失两者之间的变更
        let changes = store.changes();
        Self {
            store,
            user_id: user_id.to_string(),
            collection,
            changes,
            stale: true,
        }
    }

    /// 等待下一份快照，存储关闭时返回 None
    pub async fn next(&mut self) -> Option<Result<Vec<Document>, StoreError>> {
        loop {
            if self.stale {
                let snapshot = self.store.list(&self.user_id, self.collection).await;
                self.stale = false;
                return Some(snapshot);
            }

            match self.changes.recv().await {
                Ok(event) => {
                    self.stale =
                        event.user_id == self.user_id && event.collection == self.collection;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("订阅 {} 落后 {} 条通知，重新读取快照", self.collection, skipped);
                    self.stale = true;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

fn decode_error(collection: Collection, id: &str, source: serde_json::Error) -> StoreError {
    StoreError::Decode {
        collection,
        id: id.to_string(),
        source,
    }
}

/// 将 library / favorites 文档解析为 `Game`
///
/// 早期写入的文档不含 `id` 字段，此时以文档 key 作为游戏 ID。
pub fn decode_game(collection: Collection, doc: &Document) -> Result<Game, StoreError> {
    let mut body = doc.body.clone();
    if let Value::Object(map) = &mut body {
        if !map.contains_key("id") {
            let id: GameId = doc.id.parse().map_err(|_| {
                decode_error(
                    collection,
                    &doc.id,
                    serde::de::Error::custom("document key is not a game id"),
                )
            })?;
            map.insert("id".to_string(), Value::from(id));
        }
    }
    serde_json::from_value(body).map_err(|e| decode_error(collection, &doc.id, e))
}

/// 将 ratings 文档解析为评分
pub fn decode_rating(doc: &Document) -> Result<Rating, StoreError> {
    serde_json::from_value::<RatingDoc>(doc.body.clone())
        .map(|d| d.rating)
        .map_err(|e| decode_error(Collection::Ratings, &doc.id, e))
}

/// 某个用户的类型化文档访问
pub struct UserDocuments<'a> {
    store: &'a dyn DocumentStore,
    user_id: &'a str,
}

impl<'a> UserDocuments<'a> {
    pub fn new(store: &'a dyn DocumentStore, user_id: &'a str) -> Self {
        Self { store, user_id }
    }

    /// 游戏是否在集合中
    pub async fn contains(&self, collection: Collection, game_id: GameId) -> Result<bool, StoreError> {
        Ok(self
            .store
            .get(self.user_id, collection, &game_id.to_string())
            .await?
            .is_some())
    }

    /// 写入游戏（整体覆盖）
    pub async fn put_game(&self, collection: Collection, game: &Game) -> Result<(), StoreError> {
        let body = serde_json::to_value(game).map_err(StoreError::Encode)?;
        self.store
            .set(self.user_id, collection, &game.doc_id(), body)
            .await
    }

    pub async fn remove(&self, collection: Collection, game_id: GameId) -> Result<(), StoreError> {
        self.store
            .delete(self.user_id, collection, &game_id.to_string())
            .await
    }

    /// 读取集合中的全部游戏，无法解析的文档会被跳过
    pub async fn games(&self, collection: Collection) -> Result<Vec<Game>, StoreError> {
        let docs = self.store.list(self.user_id, collection).await?;
        Ok(games_from_documents(collection, &docs))
    }

    pub async fn rating(&self, game_id: GameId) -> Result<Option<Rating>, StoreError> {
        match self
            .store
            .get(self.user_id, Collection::Ratings, &game_id.to_string())
            .await?
        {
            Some(doc) => decode_rating(&doc).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set_rating(&self, game_id: GameId, rating: Rating) -> Result<(), StoreError> {
        let body = serde_json::to_value(RatingDoc { rating }).map_err(StoreError::Encode)?;
        self.store
            .set(self.user_id, Collection::Ratings, &game_id.to_string(), body)
            .await
    }

    /// 读取全部评分，无法解析的文档会被跳过
    pub async fn ratings(&self) -> Result<HashMap<GameId, Rating>, StoreError> {
        let docs = self.store.list(self.user_id, Collection::Ratings).await?;
        Ok(ratings_from_documents(&docs))
    }
}

pub fn games_from_documents(collection: Collection, docs: &[Document]) -> Vec<Game> {
    docs.iter()
        .filter_map(|doc| match decode_game(collection, doc) {
            Ok(game) => Some(game),
            Err(e) => {
                log::warn!("跳过无法解析的文档: {}", e);
                None
            }
        })
        .collect()
}

pub fn ratings_from_documents(docs: &[Document]) -> HashMap<GameId, Rating> {
    docs.iter()
        .filter_map(|doc| {
            let id = match doc.id.parse::<GameId>() {
                Ok(id) => id,
                Err(_) => {
                    log::warn!("跳过 key 非游戏 ID 的评分文档: {}", doc.id);
                    return None;
                }
            };
            match decode_rating(doc) {
                Ok(rating) => Some((id, rating)),
                Err(e) => {
                    log::warn!("跳过无法解析的评分: {}", e);
                    None
                }
            }
        })
        .collect()
}
