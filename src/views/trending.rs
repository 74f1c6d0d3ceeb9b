//! 趋势游戏

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, TRENDING_LIMIT};
use crate::domain::Game;

pub const TRENDING_PLACEHOLDERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingState {
    pub games: Vec<Game>,
    pub loading: bool,
}

impl TrendingState {
    pub fn placeholders(&self) -> usize {
        if self.loading { TRENDING_PLACEHOLDERS } else { 0 }
    }
}

pub struct Trending {
    catalog: Arc<dyn Catalog>,
    state: Mutex<TrendingState>,
}

impl Trending {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(TrendingState {
                games: Vec::new(),
                loading: true,
            }),
        }
    }

    pub fn snapshot(&self) -> TrendingState {
        self.state.lock().clone()
    }

    /// 失败时保留空列表，只记录日志
    pub async fn load(&self) -> Result<(), CatalogError> {
        self.state.lock().loading = true;
        let result = self.catalog.trending(TRENDING_LIMIT).await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(games) => {
                state.games = games;
                Ok(())
            }
            Err(e) => {
                log::error!("加载趋势游戏失败: {}", e);
                state.games.clear();
                Err(e)
            }
        }
    }
}
