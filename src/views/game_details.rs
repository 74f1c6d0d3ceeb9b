//! 游戏详情页面

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::game_card::GameCard;
use super::mirror::WriteOutcome;
use super::star_rating::StarRating;
use crate::auth::Session;
use crate::catalog::{Catalog, CatalogError};
use crate::domain::{GameDetails, GameId};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::DocumentStore;

pub const NOT_FOUND_MESSAGE: &str = "Game not found.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum DetailsState {
    Loading,
    Loaded(GameDetails),
    NotFound,
    Failed(String),
}

pub struct GameDetailsPage {
    id: GameId,
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn DocumentStore>,
    session: Session,
    notifier: Notifier,
    state: Mutex<DetailsState>,
    expanded: Mutex<bool>,
    card: Mutex<Option<Arc<GameCard>>>,
    rating: StarRating,
}

impl GameDetailsPage {
    pub fn new(
        id: GameId,
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn DocumentStore>,
        session: Session,
        notifier: Notifier,
    ) -> Self {
        let rating = StarRating::new(id, store.clone(), session.clone(), notifier.clone());
        Self {
            id,
            catalog,
            store,
            session,
            notifier,
            state: Mutex::new(DetailsState::Loading),
            expanded: Mutex::new(false),
            card: Mutex::new(None),
            rating,
        }
    }

    pub fn state(&self) -> DetailsState {
        self.state.lock().clone()
    }

    /// 加载详情；成功后为该游戏创建卡片并读取用户状态
    pub async fn load(&self) -> DetailsState {
        *self.state.lock() = DetailsState::Loading;

        let next = match self.catalog.game_details(self.id).await {
            Ok(details) => {
                let card = Arc::new(GameCard::new(
                    details.to_game(),
                    self.store.clone(),
                    self.session.clone(),
                    self.notifier.clone(),
                ));
                tokio::join!(card.refresh(), self.rating.load());
                *self.card.lock() = Some(card);
                DetailsState::Loaded(details)
            }
            Err(CatalogError::NotFound(id)) => {
                log::warn!("游戏 {} 不存在", id);
                DetailsState::NotFound
            }
            Err(e) => {
                log::error!("加载游戏 {} 详情失败: {}", self.id, e);
                DetailsState::Failed(e.to_string())
            }
        };

        *self.state.lock() = next.clone();
        next
    }

    /// 页面上展示的提示文本
    pub fn message(&self) -> Option<String> {
        match &*self.state.lock() {
            DetailsState::NotFound => Some(NOT_FOUND_MESSAGE.to_string()),
            DetailsState::Failed(reason) => Some(format!("Failed to load game: {}", reason)),
            _ => None,
        }
    }

    pub fn toggle_description(&self) -> bool {
        let mut expanded = self.expanded.lock();
        *expanded = !*expanded;
        *expanded
    }

    pub fn description_expanded(&self) -> bool {
        *self.expanded.lock()
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.description_expanded() {
            "Show Less"
        } else {
            "Read More"
        }
    }

    pub fn card(&self) -> Option<Arc<GameCard>> {
        self.card.lock().clone()
    }

    pub fn rating(&self) -> &StarRating {
        &self.rating
    }

    /// 通过页面评分，保存成功后卡片同步显示新评分
    pub async fn rate(&self, value: f64) -> Result<WriteOutcome, AppError> {
        let outcome = self.rating.rate(value).await?;
        if outcome == WriteOutcome::Applied {
            if let Some(card) = self.card() {
                card.set_user_rating(self.rating.snapshot().rating.value);
            }
        }
        Ok(outcome)
    }
}
