//! 命令接口
//!
//! 面向 UI 宿主的扁平命令，错误统一转换为字符串。
//! 需要本地状态（乐观更新、防抖等）的交互请直接使用 `views` 中的视图。

use crate::app::AppState;
use crate::catalog::{GamePage, GameQuery, TRENDING_LIMIT};
use crate::domain::{Category, Game, GameDetails, GameId, Rating, User};
use crate::store::{Collection, UserDocuments};
use crate::utils::logs::{self, LogLevel};
use crate::views::LibraryView;

fn current_uid(state: &AppState) -> Result<String, String> {
    state
        .session
        .user_id()
        .ok_or_else(|| "用户未登录".to_string())
}

// ==================== 目录 ====================

/// 分页获取游戏列表
pub async fn list_games(
    state: &AppState,
    page: u32,
    genre: Option<u64>,
    search: Option<String>,
) -> Result<GamePage, String> {
    let mut query = GameQuery::page(page.max(1))
        .with_genre(genre)
        .with_page_size(state.config.catalog.page_size);
    if let Some(search) = search {
        query = query.with_search(&search);
    }
    state
        .catalog
        .list_games(&query)
        .await
        .map_err(|e| format!("获取游戏列表失败: {}", e))
}

pub async fn get_game_details(state: &AppState, id: GameId) -> Result<GameDetails, String> {
    state
        .catalog
        .game_details(id)
        .await
        .map_err(|e| format!("获取游戏详情失败: {}", e))
}

pub async fn list_genres(state: &AppState) -> Result<Vec<Category>, String> {
    state
        .catalog
        .genres()
        .await
        .map_err(|e| format!("获取分类失败: {}", e))
}

pub async fn list_trending(state: &AppState) -> Result<Vec<Game>, String> {
    state
        .catalog
        .trending(TRENDING_LIMIT)
        .await
        .map_err(|e| format!("获取趋势游戏失败: {}", e))
}

// ==================== 账号 ====================

pub async fn sign_up(state: &AppState, email: String, password: String) -> Result<User, String> {
    state
        .session
        .sign_up(&email, &password)
        .await
        .map_err(|e| format!("注册失败: {}", e))
}

pub async fn sign_in(state: &AppState, email: String, password: String) -> Result<User, String> {
    state
        .session
        .sign_in(&email, &password)
        .await
        .map_err(|e| format!("登录失败: {}", e))
}

pub fn sign_out(state: &AppState) {
    state.session.sign_out();
}

pub fn get_current_user(state: &AppState) -> Option<User> {
    state.session.current_user()
}

pub async fn update_display_name(state: &AppState, name: String) -> Result<User, String> {
    state
        .session
        .update_display_name(&name)
        .await
        .map_err(|e| format!("修改展示名称失败: {}", e))
}

// ==================== 用户集合 ====================

/// 获取集合中的全部游戏（library 或 favorites）
pub async fn get_collection_games(
    state: &AppState,
    collection: String,
) -> Result<Vec<Game>, String> {
    let collection: Collection = collection.parse().map_err(|e| format!("{}", e))?;
    let uid = current_uid(state)?;
    UserDocuments::new(&*state.store, &uid)
        .games(collection)
        .await
        .map_err(|e| format!("获取 {} 失败: {}", collection, e))
}

pub async fn add_to_collection(
    state: &AppState,
    collection: String,
    game: Game,
) -> Result<(), String> {
    let collection: Collection = collection.parse().map_err(|e| format!("{}", e))?;
    let uid = current_uid(state)?;
    UserDocuments::new(&*state.store, &uid)
        .put_game(collection, &game)
        .await
        .map_err(|e| format!("添加到 {} 失败: {}", collection, e))
}

pub async fn remove_from_collection(
    state: &AppState,
    collection: String,
    game_id: GameId,
) -> Result<(), String> {
    let collection: Collection = collection.parse().map_err(|e| format!("{}", e))?;
    let uid = current_uid(state)?;
    UserDocuments::new(&*state.store, &uid)
        .remove(collection, game_id)
        .await
        .map_err(|e| format!("从 {} 移除失败: {}", collection, e))
}

pub async fn is_in_collection(
    state: &AppState,
    collection: String,
    game_id: GameId,
) -> Result<bool, String> {
    let collection: Collection = collection.parse().map_err(|e| format!("{}", e))?;
    let Some(uid) = state.session.user_id() else {
        return Ok(false);
    };
    UserDocuments::new(&*state.store, &uid)
        .contains(collection, game_id)
        .await
        .map_err(|e| format!("查询 {} 失败: {}", collection, e))
}

// ==================== 评分 ====================

pub async fn get_rating(state: &AppState, game_id: GameId) -> Result<Option<f64>, String> {
    let Some(uid) = state.session.user_id() else {
        return Ok(None);
    };
    UserDocuments::new(&*state.store, &uid)
        .rating(game_id)
        .await
        .map(|r| r.map(Rating::value))
        .map_err(|e| format!("获取评分失败: {}", e))
}

pub async fn set_rating(state: &AppState, game_id: GameId, value: f64) -> Result<(), String> {
    let rating = Rating::new(value).map_err(|e| e.to_string())?;
    let uid = current_uid(state)?;
    UserDocuments::new(&*state.store, &uid)
        .set_rating(game_id, rating)
        .await
        .map_err(|e| format!("保存评分失败: {}", e))
}

pub async fn get_library(state: &AppState) -> Result<LibraryView, String> {
    state
        .library_page()
        .load()
        .await
        .map_err(|e| format!("获取游戏库失败: {}", e))
}

// ==================== 日志 ====================

pub fn set_log_level(level: String) -> Result<(), String> {
    logs::set_log_level(&level)
}

pub fn get_log_level() -> LogLevel {
    logs::get_log_level()
}
