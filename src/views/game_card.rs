//! 游戏卡片
//!
//! 卡片镜像当前用户的 library / favorites 成员关系和评分，添加、移除操作为乐观写入。

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::mirror::{Mirrored, WriteOutcome, optimistic};
use crate::auth::Session;
use crate::domain::rating::{self, MAX_STARS};
use crate::domain::{Game, Rating, StarFill};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::{Collection, DocumentStore, UserDocuments};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameCardState {
    pub in_library: Mirrored<bool>,
    pub in_favorites: Mirrored<bool>,
    pub user_rating: Option<Rating>,
    pub menu_open: bool,
}

fn library_slot(state: &mut GameCardState) -> &mut Mirrored<bool> {
    &mut state.in_library
}

fn favorites_slot(state: &mut GameCardState) -> &mut Mirrored<bool> {
    &mut state.in_favorites
}

type Slot = fn(&mut GameCardState) -> &mut Mirrored<bool>;

fn slot_for(collection: Collection) -> Result<Slot, AppError> {
    match collection {
        Collection::Library => Ok(library_slot),
        Collection::Favorites => Ok(favorites_slot),
        Collection::Ratings => Err(AppError::InvalidInput(
            "ratings are not a game collection".to_string(),
        )),
    }
}

pub struct GameCard {
    game: Game,
    store: Arc<dyn DocumentStore>,
    session: Session,
    notifier: Notifier,
    state: Mutex<GameCardState>,
}

impl GameCard {
    pub fn new(
        game: Game,
        store: Arc<dyn DocumentStore>,
        session: Session,
        notifier: Notifier,
    ) -> Self {
        Self {
            game,
            store,
            session,
            notifier,
            state: Mutex::new(GameCardState::default()),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn snapshot(&self) -> GameCardState {
        self.state.lock().clone()
    }

    /// 重新读取成员关系和评分
    ///
    /// 未登录时恢复默认状态；单项读取失败只记录日志，保留该项原值。
    /// 读取期间发生过写入的项以写入结果为准。
    /// 登录身份变化时需要重新调用，可配合 `follow_session` 使用。
    pub async fn refresh(&self) {
        let Some(uid) = self.session.user_id() else {
            let mut state = self.state.lock();
            state.in_library.sync(false);
            state.in_favorites.sync(false);
            state.user_rating = None;
            return;
        };

        let (library_epoch, favorites_epoch) = {
            let state = self.state.lock();
            (state.in_library.epoch(), state.in_favorites.epoch())
        };

        let docs = UserDocuments::new(&*self.store, &uid);
        let (library, favorites, user_rating) = tokio::join!(
            docs.contains(Collection::Library, self.game.id),
            docs.contains(Collection::Favorites, self.game.id),
            docs.rating(self.game.id),
        );

        let mut state = self.state.lock();
        match library {
            Ok(found) => {
                if !state.in_library.sync_since(library_epoch, found) {
                    log::debug!("丢弃过期的 library 状态 (game {})", self.game.id);
                }
            }
            Err(e) => log::warn!("读取 library 状态失败 (game {}): {}", self.game.id, e),
        }
        match favorites {
            Ok(found) => {
                if !state.in_favorites.sync_since(favorites_epoch, found) {
                    log::debug!("丢弃过期的 favorites 状态 (game {})", self.game.id);
                }
            }
            Err(e) => log::warn!("读取 favorites 状态失败 (game {}): {}", self.game.id, e),
        }
        match user_rating {
            Ok(rating) => state.user_rating = rating,
            Err(e) => log::warn!("读取用户评分失败 (game {}): {}", self.game.id, e),
        }
    }

    /// 跟随登录状态，每次身份变化后重新读取
    ///
    /// 不会自行结束，由调用方在卡片卸载时取消。
    pub async fn follow_session(&self) {
        let mut auth_state = self.session.subscribe();
        while auth_state.changed().await.is_ok() {
            self.refresh().await;
        }
    }

    /// 评分控件保存成功后同步到卡片
    pub(crate) fn set_user_rating(&self, rating: Option<Rating>) {
        self.state.lock().user_rating = rating;
    }

    pub async fn add_to_library(&self) -> Result<WriteOutcome, AppError> {
        self.add_to(Collection::Library).await
    }

    pub async fn add_to_favorites(&self) -> Result<WriteOutcome, AppError> {
        self.add_to(Collection::Favorites).await
    }

    async fn add_to(&self, collection: Collection) -> Result<WriteOutcome, AppError> {
        let slot = slot_for(collection)?;
        let Some(uid) = self.session.user_id() else {
            self.notifier.error(match collection {
                Collection::Favorites => "You need to be logged in to add a game to favorites.",
                _ => "You need to be logged in to add a game to your library.",
            });
            return Err(AppError::NotSignedIn);
        };

        self.state.lock().menu_open = false;
        let docs = UserDocuments::new(&*self.store, &uid);
        let write = docs.put_game(collection, &self.game);
        match optimistic(&self.state, slot, true, write).await {
            Ok(WriteOutcome::Applied) => {
                self.notifier.success(format!(
                    "{} added to your {}!",
                    self.game.title, collection
                ));
                Ok(WriteOutcome::Applied)
            }
            Ok(WriteOutcome::Skipped) => Ok(WriteOutcome::Skipped),
            Err(e) => {
                log::error!("添加到 {} 失败 (game {}): {}", collection, self.game.id, e);
                self.notifier.error(format!("Failed to add to {}.", collection));
                Err(e.into())
            }
        }
    }

    pub async fn remove_from(&self, collection: Collection) -> Result<WriteOutcome, AppError> {
        let slot = slot_for(collection)?;
        let uid = self.session.user_id().ok_or(AppError::NotSignedIn)?;

        self.state.lock().menu_open = false;
        let docs = UserDocuments::new(&*self.store, &uid);
        let write = docs.remove(collection, self.game.id);
        match optimistic(&self.state, slot, false, write).await {
            Ok(WriteOutcome::Applied) => {
                self.notifier.success(format!("Removed from {}", collection));
                Ok(WriteOutcome::Applied)
            }
            Ok(WriteOutcome::Skipped) => Ok(WriteOutcome::Skipped),
            Err(e) => {
                log::error!("从 {} 移除失败 (game {}): {}", collection, self.game.id, e);
                self.notifier
                    .error(format!("Failed to remove from {}", collection));
                Err(e.into())
            }
        }
    }

    pub fn toggle_menu(&self) -> bool {
        let mut state = self.state.lock();
        state.menu_open = !state.menu_open;
        state.menu_open
    }

    /// 用户评分优先，否则为目录评分
    pub fn displayed_rating(&self) -> f64 {
        rating::displayed_rating(self.state.lock().user_rating, self.game.rating)
    }

    pub fn stars(&self) -> [StarFill; MAX_STARS] {
        rating::stars(self.displayed_rating())
    }
}
