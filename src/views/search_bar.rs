//! 搜索框
//!
//! 每次输入都会重新开始防抖计时，计时结束后才发出搜索请求。新的输入会中止
//! 上一次的任务并递增代数，过期任务的结果即使已经返回也会被丢弃。

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::catalog::{Catalog, GameQuery};
use crate::domain::{Game, GameId};
use crate::notify::Notifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    Loading,
    Results,
    Empty,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub phase: SearchPhase,
    pub results: Vec<Game>,
    pub dropdown_open: bool,
    #[serde(skip)]
    generation: u64,
}

struct SearchInner {
    catalog: Arc<dyn Catalog>,
    notifier: Notifier,
    debounce: Duration,
    state: Mutex<SearchState>,
}

pub struct SearchBar {
    inner: Arc<SearchInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SearchBar {
    pub fn new(catalog: Arc<dyn Catalog>, notifier: Notifier, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                catalog,
                notifier,
                debounce,
                state: Mutex::new(SearchState::default()),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> SearchState {
        self.inner.state.lock().clone()
    }

    /// 输入框内容变化
    ///
    /// 需要在 tokio 运行时中调用。空白输入立即清空结果，不发出请求。
    pub fn input(&self, text: &str) {
        let blank = text.trim().is_empty();
        let generation = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.query = text.to_string();
            if blank {
                state.phase = SearchPhase::Idle;
                state.results.clear();
                state.dropdown_open = false;
            } else {
                state.phase = SearchPhase::Debouncing;
            }
            state.generation
        };

        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        if blank {
            return;
        }

        let inner = self.inner.clone();
        let query = text.to_string();
        *task = Some(tokio::spawn(async move {
            inner.run(generation, query).await;
        }));
    }

    pub fn clear(&self) {
        self.input("");
    }

    /// 选中搜索结果：关闭下拉框并清空输入
    pub fn select(&self, id: GameId) -> Option<Game> {
        let selected = self
            .inner
            .state
            .lock()
            .results
            .iter()
            .find(|g| g.id == id)
            .cloned();
        self.clear();
        selected
    }

    /// 关闭下拉框，保留输入和结果
    pub fn dismiss(&self) {
        self.inner.state.lock().dropdown_open = false;
    }

    /// 等待当前搜索任务结束
    pub async fn settle(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            // 被中止的任务返回 JoinError，无需处理
            let _ = task.await;
        }
    }
}

impl Drop for SearchBar {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl SearchInner {
    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    async fn run(&self, generation: u64, text: String) {
        tokio::time::sleep(self.debounce).await;

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.phase = SearchPhase::Loading;
        }

        let query = GameQuery::page(1).with_search(&text);
        log::debug!("搜索: {:?}", query.search);
        let result = self.catalog.list_games(&query).await;

        if !self.is_current(generation) {
            log::debug!("丢弃过期的搜索结果: {}", text);
            return;
        }

        let mut state = self.state.lock();
        match result {
            Ok(page) if page.games.is_empty() => {
                state.phase = SearchPhase::Empty;
                state.results.clear();
                state.dropdown_open = false;
                drop(state);
                self.notifier.error("No results found.");
            }
            Ok(page) => {
                state.phase = SearchPhase::Results;
                state.results = page.games;
                state.dropdown_open = true;
            }
            Err(e) => {
                state.phase = SearchPhase::Error;
                state.results.clear();
                state.dropdown_open = false;
                drop(state);
                log::error!("搜索失败: {}", e);
                self.notifier
                    .error("Failed to fetch results. Please try again later.");
            }
        }
    }
}
