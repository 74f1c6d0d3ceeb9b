//! 游戏网格
//!
//! 按页码累积目录列表：第 1 页替换，后续页追加并按 ID 去重。
//! 切换分类会重置到第 1 页，旧请求的响应通过代数（generation）丢弃。

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, GameQuery};
use crate::domain::{Category, Game};
use crate::notify::Notifier;

/// 首页加载期间展示的占位卡片数
pub const PLACEHOLDER_CARDS: usize = 15;

const ALL_GAMES_TITLE: &str = "All Games";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridState {
    pub games: Vec<Game>,
    /// 最后一次请求的页码
    pub page: u32,
    pub has_more: bool,
    /// 第 1 页加载中
    pub loading: bool,
    /// 后续页加载中
    pub loading_more: bool,
    pub genre: Option<Category>,
    pub error: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl GridState {
    pub fn title(&self) -> &str {
        self.genre
            .as_ref()
            .map(|g| g.name.as_str())
            .unwrap_or(ALL_GAMES_TITLE)
    }

    pub fn placeholders(&self) -> usize {
        if self.loading { PLACEHOLDER_CARDS } else { 0 }
    }

    pub fn show_load_more(&self) -> bool {
        self.has_more && !self.loading
    }

    pub fn load_more_enabled(&self) -> bool {
        self.show_load_more() && !self.loading_more
    }
}

/// 追加新一页，丢弃已存在的 ID，保持首次出现的顺序
pub fn merge_unique(mut prior: Vec<Game>, incoming: Vec<Game>) -> Vec<Game> {
    let mut seen: HashSet<_> = prior.iter().map(|g| g.id).collect();
    prior.extend(incoming.into_iter().filter(|g| seen.insert(g.id)));
    prior
}

pub struct GameGrid {
    catalog: Arc<dyn Catalog>,
    notifier: Notifier,
    page_size: Option<u32>,
    state: Mutex<GridState>,
}

impl GameGrid {
    pub fn new(catalog: Arc<dyn Catalog>, notifier: Notifier, page_size: Option<u32>) -> Self {
        Self {
            catalog,
            notifier,
            page_size,
            state: Mutex::new(GridState {
                loading: true,
                ..Default::default()
            }),
        }
    }

    pub fn snapshot(&self) -> GridState {
        self.state.lock().clone()
    }

    fn query(&self, page: u32, genre: Option<&Category>) -> GameQuery {
        GameQuery::page(page)
            .with_genre(genre.map(|g| g.id))
            .with_page_size(self.page_size)
    }

    /// 加载第 1 页并替换现有列表
    pub async fn load_first(&self) -> Result<(), CatalogError> {
        let (generation, query) = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.page = 1;
            state.games.clear();
            state.has_more = false;
            state.loading = true;
            state.loading_more = false;
            state.error = None;
            (state.generation, self.query(1, state.genre.as_ref()))
        };

        let result = self.catalog.list_games(&query).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!("丢弃过期的第 1 页响应 (generation {})", generation);
            return Ok(());
        }
        state.loading = false;
        match result {
            Ok(page) => {
                state.games = merge_unique(Vec::new(), page.games);
                state.has_more = page.has_next;
                Ok(())
            }
            Err(e) => {
                log::error!("加载游戏列表失败: {}", e);
                state.error = Some("Failed to load games.".to_string());
                Err(e)
            }
        }
    }

    /// 加载下一页并追加
    ///
    /// 没有下一页或已有请求进行中时返回 `Ok(false)`；请求失败时页码回退。
    pub async fn load_more(&self) -> Result<bool, CatalogError> {
        let (generation, query) = {
            let mut state = self.state.lock();
            if !state.load_more_enabled() {
                return Ok(false);
            }
            state.loading_more = true;
            state.page += 1;
            (state.generation, self.query(state.page, state.genre.as_ref()))
        };

        let result = self.catalog.list_games(&query).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(false);
        }
        state.loading_more = false;
        match result {
            Ok(page) => {
                let prior = std::mem::take(&mut state.games);
                state.games = merge_unique(prior, page.games);
                state.has_more = page.has_next;
                Ok(true)
            }
            Err(e) => {
                state.page -= 1;
                drop(state);
                log::error!("加载第 {} 页失败: {}", query.page, e);
                self.notifier.error("Failed to load more games.");
                Err(e)
            }
        }
    }

    /// 切换分类（None 为全部），重新加载第 1 页
    pub async fn select_genre(&self, genre: Option<Category>) -> Result<(), CatalogError> {
        self.state.lock().genre = genre;
        self.load_first().await
    }
}
