//! 分类列表

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError};
use crate::domain::{Category, CategoryId};

/// 加载期间展示的占位数
pub const CATEGORY_PLACEHOLDERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoriesState {
    pub categories: Vec<Category>,
    pub loading: bool,
    pub selected: Option<CategoryId>,
    pub error: Option<String>,
}

impl CategoriesState {
    pub fn placeholders(&self) -> usize {
        if self.loading { CATEGORY_PLACEHOLDERS } else { 0 }
    }
}

pub struct Categories {
    catalog: Arc<dyn Catalog>,
    state: Mutex<CategoriesState>,
}

impl Categories {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(CategoriesState {
                categories: Vec::new(),
                loading: true,
                selected: None,
                error: None,
            }),
        }
    }

    pub fn snapshot(&self) -> CategoriesState {
        self.state.lock().clone()
    }

    pub async fn load(&self) -> Result<(), CatalogError> {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self.catalog.genres().await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(categories) => {
                state.categories = categories;
                Ok(())
            }
            Err(e) => {
                log::error!("加载分类失败: {}", e);
                state.error = Some("Failed to load categories.".to_string());
                Err(e)
            }
        }
    }

    /// 点击分类：选中未选中的分类，再次点击已选中的分类则取消选择
    ///
    /// 返回点击后的选中分类，供游戏网格切换过滤条件。
    pub fn click(&self, id: CategoryId) -> Option<Category> {
        let mut state = self.state.lock();
        if state.selected == Some(id) {
            state.selected = None;
            return None;
        }
        let category = state.categories.iter().find(|c| c.id == id).cloned()?;
        state.selected = Some(id);
        Some(category)
    }
}
