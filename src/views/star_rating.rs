//! 星级评分控件

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::mirror::{Mirrored, WriteOutcome, optimistic};
use crate::auth::Session;
use crate::domain::rating::{self, MAX_STARS};
use crate::domain::{GameId, Rating, StarFill};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::{DocumentStore, UserDocuments};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StarRatingState {
    pub rating: Mirrored<Option<Rating>>,
    /// 鼠标悬停预览值
    pub hover: Option<f64>,
}

fn rating_slot(state: &mut StarRatingState) -> &mut Mirrored<Option<Rating>> {
    &mut state.rating
}

pub struct StarRating {
    game_id: GameId,
    store: Arc<dyn DocumentStore>,
    session: Session,
    notifier: Notifier,
    state: Mutex<StarRatingState>,
}

impl StarRating {
    pub fn new(
        game_id: GameId,
        store: Arc<dyn DocumentStore>,
        session: Session,
        notifier: Notifier,
    ) -> Self {
        Self {
            game_id,
            store,
            session,
            notifier,
            state: Mutex::new(StarRatingState::default()),
        }
    }

    pub fn snapshot(&self) -> StarRatingState {
        self.state.lock().clone()
    }

    /// 读取已保存的评分；读取期间保存过评分时保留保存的值
    pub async fn load(&self) {
        let Some(uid) = self.session.user_id() else {
            self.state.lock().rating.sync(None);
            return;
        };

        let epoch = self.state.lock().rating.epoch();
        match UserDocuments::new(&*self.store, &uid).rating(self.game_id).await {
            Ok(rating) => {
                if !self.state.lock().rating.sync_since(epoch, rating) {
                    log::debug!("丢弃过期的评分 (game {})", self.game_id);
                }
            }
            Err(e) => log::error!("读取评分失败 (game {}): {}", self.game_id, e),
        }
    }

    /// 每次登录身份变化后重新读取，由调用方取消
    pub async fn follow_session(&self) {
        let mut auth_state = self.session.subscribe();
        while auth_state.changed().await.is_ok() {
            self.load().await;
        }
    }

    /// 保存评分，失败时恢复原评分
    pub async fn rate(&self, value: f64) -> Result<WriteOutcome, AppError> {
        let rating = Rating::new(value)?;
        let Some(uid) = self.session.user_id() else {
            self.notifier.error("You need to be logged in to rate a game.");
            return Err(AppError::NotSignedIn);
        };

        let docs = UserDocuments::new(&*self.store, &uid);
        let write = docs.set_rating(self.game_id, rating);
        optimistic(&self.state, rating_slot, Some(rating), write)
            .await
            .map_err(|e| {
                log::error!("保存评分失败 (game {}): {}", self.game_id, e);
                self.notifier.error("Failed to save rating.");
                AppError::from(e)
            })
    }

    pub fn hover(&self, value: f64) {
        self.state.lock().hover = Some(value.clamp(0.0, MAX_STARS as f64));
    }

    pub fn unhover(&self) {
        self.state.lock().hover = None;
    }

    /// 悬停时显示预览值，否则显示已保存的评分
    pub fn displayed(&self) -> f64 {
        let state = self.state.lock();
        state
            .hover
            .unwrap_or_else(|| state.rating.value.map(Rating::value).unwrap_or(0.0))
    }

    pub fn stars(&self) -> [StarFill; MAX_STARS] {
        rating::stars(self.displayed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, SlowReads};
    use std::time::Duration;

    fn widget(fx: &Fixture, game_id: GameId) -> StarRating {
        StarRating::new(
            game_id,
            fx.store.clone(),
            fx.session.clone(),
            fx.notifier.clone(),
        )
    }

    #[tokio::test]
    async fn test_rate_persists_half_stars() {
        let fx = Fixture::signed_in();
        let stars = widget(&fx, 12);
        stars.load().await;
        assert_eq!(stars.displayed(), 0.0);

        stars.rate(3.5).await.unwrap();
        assert_eq!(stars.displayed(), 3.5);
        assert_eq!(fx.docs().rating(12).await.unwrap().map(Rating::value), Some(3.5));

        let reloaded = widget(&fx, 12);
        reloaded.load().await;
        assert_eq!(reloaded.stars()[3], StarFill::Half);
    }

    #[tokio::test]
    async fn test_failed_rate_restores_previous() {
        let fx = Fixture::signed_in();
        let mut toasts = fx.notifier.subscribe();
        let stars = widget(&fx, 12);
        stars.rate(2.0).await.unwrap();

        fx.store.set_offline(true);
        assert!(stars.rate(5.0).await.is_err());
        let state = stars.snapshot();
        assert_eq!(state.rating.value, Rating::new(2.0).ok());
        assert!(!state.rating.pending);
        assert_eq!(toasts.try_recv().unwrap().message, "Failed to save rating.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_started_before_rate_keeps_saved_rating() {
        let fx = Fixture::signed_in();
        let store = Arc::new(SlowReads {
            inner: fx.store.clone(),
            delay: Duration::from_millis(100),
        });
        let stars = StarRating::new(8, store, fx.session.clone(), fx.notifier.clone());

        let ((), rated) = tokio::join!(stars.load(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            stars.rate(4.5).await
        });
        rated.unwrap();

        assert_eq!(stars.displayed(), 4.5);
        assert_eq!(fx.docs().rating(8).await.unwrap().map(Rating::value), Some(4.5));
    }

    #[tokio::test]
    async fn test_invalid_value_is_rejected_before_write() {
        let fx = Fixture::signed_in();
        let stars = widget(&fx, 12);
        assert!(matches!(
            stars.rate(4.3).await,
            Err(AppError::InvalidRating(_))
        ));
        assert!(fx.docs().rating(12).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hover_previews_without_saving() {
        let fx = Fixture::signed_in();
        let stars = widget(&fx, 1);
        stars.rate(1.0).await.unwrap();

        stars.hover(4.0);
        assert_eq!(stars.displayed(), 4.0);
        stars.unhover();
        assert_eq!(stars.displayed(), 1.0);
    }
}
