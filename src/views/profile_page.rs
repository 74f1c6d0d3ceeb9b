//! 个人资料页面
//!
//! 头像字母与展示名称、收藏列表维护、修改展示名称和退出登录。

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{AuthError, Session};
use crate::domain::{Game, GameId, User};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::{Collection, DocumentStore, UserDocuments};

/// 未登录时的提示文本
pub const SIGNED_OUT_PROMPT: &str = "Please log in to view your profile.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileHeader {
    pub initial: Option<char>,
    pub display_name: String,
    pub email: String,
}

impl From<&User> for ProfileHeader {
    fn from(user: &User) -> Self {
        Self {
            initial: user.initial(),
            display_name: user.display_label().to_string(),
            email: user.email.clone(),
        }
    }
}

pub struct ProfilePage {
    store: Arc<dyn DocumentStore>,
    session: Session,
    notifier: Notifier,
    favorites: Mutex<Vec<Game>>,
}

impl ProfilePage {
    pub fn new(store: Arc<dyn DocumentStore>, session: Session, notifier: Notifier) -> Self {
        Self {
            store,
            session,
            notifier,
            favorites: Mutex::new(Vec::new()),
        }
    }

    /// 当前用户的头部信息，未登录时为 None
    pub fn header(&self) -> Option<ProfileHeader> {
        self.session.current_user().as_ref().map(ProfileHeader::from)
    }

    /// 未登录时返回提示文本
    pub fn prompt(&self) -> Option<&'static str> {
        (!self.session.is_signed_in()).then_some(SIGNED_OUT_PROMPT)
    }

    pub fn favorites(&self) -> Vec<Game> {
        self.favorites.lock().clone()
    }

    fn uid(&self) -> Result<String, AppError> {
        self.session.user_id().ok_or(AppError::NotSignedIn)
    }

    pub async fn load_favorites(&self) -> Result<Vec<Game>, AppError> {
        let Some(uid) = self.session.user_id() else {
            self.favorites.lock().clear();
            return Ok(Vec::new());
        };

        let games = UserDocuments::new(&*self.store, &uid)
            .games(Collection::Favorites)
            .await
            .inspect_err(|e| log::error!("读取收藏列表失败: {}", e))?;
        *self.favorites.lock() = games.clone();
        Ok(games)
    }

    /// 先写入再追加到本地列表，已存在的游戏不会重复出现
    pub async fn add_favorite(&self, game: &Game) -> Result<(), AppError> {
        let uid = self.uid()?;
        if let Err(e) = UserDocuments::new(&*self.store, &uid)
            .put_game(Collection::Favorites, game)
            .await
        {
            log::error!("添加收藏失败 (game {}): {}", game.id, e);
            self.notifier.error("Failed to add game to favorites.");
            return Err(e.into());
        }

        {
            let mut favorites = self.favorites.lock();
            if !favorites.iter().any(|g| g.id == game.id) {
                favorites.push(game.clone());
            }
        }
        self.notifier
            .success(format!("{} added to your favorites!", game.title));
        Ok(())
    }

    /// 先删除再从本地列表过滤
    pub async fn remove_favorite(&self, game_id: GameId) -> Result<(), AppError> {
        let uid = self.uid()?;
        if let Err(e) = UserDocuments::new(&*self.store, &uid)
            .remove(Collection::Favorites, game_id)
            .await
        {
            log::error!("移除收藏失败 (game {}): {}", game_id, e);
            self.notifier.error("Failed to remove game.");
            return Err(e.into());
        }

        self.favorites.lock().retain(|g| g.id != game_id);
        self.notifier.success("Game removed from favorites.");
        Ok(())
    }

    pub async fn rename(&self, name: &str) -> Result<User, AppError> {
        if name.trim().is_empty() {
            self.notifier.error("Name cannot be empty.");
            return Err(AppError::InvalidInput("Name cannot be empty.".to_string()));
        }

        match self.session.update_display_name(name).await {
            Ok(user) => {
                self.notifier.success("Display name updated successfully!");
                Ok(user)
            }
            Err(AuthError::NotSignedIn) => Err(AppError::NotSignedIn),
            Err(e) => {
                log::error!("修改展示名称失败: {}", e);
                self.notifier.error("Failed to update display name.");
                Err(e.into())
            }
        }
    }

    pub fn sign_out(&self) {
        self.session.sign_out();
        self.favorites.lock().clear();
        self.notifier.success("Logged out successfully!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, game};

    fn page(fx: &Fixture) -> ProfilePage {
        ProfilePage::new(fx.store.clone(), fx.session.clone(), fx.notifier.clone())
    }

    #[tokio::test]
    async fn test_signed_out_shows_prompt() {
        let fx = Fixture::signed_out();
        let profile = page(&fx);
        assert_eq!(profile.prompt(), Some(SIGNED_OUT_PROMPT));
        assert!(profile.header().is_none());
        assert!(profile.load_favorites().await.unwrap().is_empty());
        assert!(matches!(
            profile.add_favorite(&game(1)).await,
            Err(AppError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_favorites_add_is_not_duplicated() {
        let fx = Fixture::signed_in();
        let profile = page(&fx);
        profile.load_favorites().await.unwrap();

        profile.add_favorite(&game(4)).await.unwrap();
        profile.add_favorite(&game(4)).await.unwrap();
        assert_eq!(profile.favorites().len(), 1);

        profile.remove_favorite(4).await.unwrap();
        assert!(profile.favorites().is_empty());
        assert!(fx.docs().games(Collection::Favorites).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_local_list() {
        let fx = Fixture::signed_in();
        let profile = page(&fx);
        profile.add_favorite(&game(4)).await.unwrap();

        fx.store.set_offline(true);
        assert!(profile.remove_favorite(4).await.is_err());
        assert_eq!(profile.favorites().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_updates_header() {
        let fx = Fixture::signed_in();
        let mut toasts = fx.notifier.subscribe();
        let profile = page(&fx);
        assert_eq!(profile.header().unwrap().initial, Some('U'));

        assert!(profile.rename("  ").await.is_err());
        assert_eq!(toasts.try_recv().unwrap().message, "Name cannot be empty.");

        profile.rename("yoshi").await.unwrap();
        let header = profile.header().unwrap();
        assert_eq!(header.display_name, "yoshi");
        assert_eq!(header.initial, Some('Y'));
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let fx = Fixture::signed_in();
        let profile = page(&fx);
        profile.add_favorite(&game(2)).await.unwrap();

        profile.sign_out();
        assert!(profile.favorites().is_empty());
        assert_eq!(profile.prompt(), Some(SIGNED_OUT_PROMPT));
    }
}
