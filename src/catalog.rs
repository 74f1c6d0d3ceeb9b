//! 游戏目录 API
//!
//! 目录是只读的第三方 REST 服务（RAWG 格式）。`Catalog` trait 是视图层依赖的接口，
//! `RawgClient` 为基于 reqwest 的实现。

pub mod client;
pub mod dto;

use async_trait::async_trait;

use crate::domain::{Category, CategoryId, Game, GameDetails, GameId};

pub use client::RawgClient;

/// 趋势列表默认条数
pub const TRENDING_LIMIT: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog responded with status {0}")]
    Status(u16),
    #[error("game {0} not found")]
    NotFound(GameId),
    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid catalog record: {0}")]
    Invalid(String),
    #[error("invalid catalog url: {0}")]
    Url(#[from] url::ParseError),
}

/// 游戏列表查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    /// 页码，从 1 开始
    pub page: u32,
    pub page_size: Option<u32>,
    pub genre: Option<CategoryId>,
    pub search: Option<String>,
}

impl GameQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: Option<CategoryId>) -> Self {
        self.genre = genre;
        self
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// 搜索词会被 trim 并转为小写
    pub fn with_search(mut self, search: &str) -> Self {
        let normalized = search.trim().to_lowercase();
        self.search = (!normalized.is_empty()).then_some(normalized);
        self
    }
}

/// 一页游戏列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePage {
    pub games: Vec<Game>,
    /// API 是否报告存在下一页
    pub has_next: bool,
    pub total: Option<u64>,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// 分页获取游戏列表（可按分类或搜索词过滤）
    async fn list_games(&self, query: &GameQuery) -> Result<GamePage, CatalogError>;

    /// 获取单个游戏详情
    async fn game_details(&self, id: GameId) -> Result<GameDetails, CatalogError>;

    /// 获取全部分类
    async fn genres(&self) -> Result<Vec<Category>, CatalogError>;

    /// 获取按新增热度排序的趋势游戏
    async fn trending(&self, limit: u32) -> Result<Vec<Game>, CatalogError>;
}
