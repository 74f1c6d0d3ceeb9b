//! 游戏库页面
//!
//! 将 library 集合与 ratings 集合合并，按用户评分分组，并提供各分组数量（图表数据）。

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::Session;
use crate::domain::{Game, GameId, Rating, RatingBucket};
use crate::error::AppError;
use crate::store::{
    Collection, Document, DocumentStore, StoreError, Subscription, UserDocuments, games_from_documents,
    ratings_from_documents,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryEntry {
    pub game: Game,
    pub user_rating: Option<Rating>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingGroup {
    pub bucket: RatingBucket,
    pub label: &'static str,
    pub entries: Vec<LibraryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryView {
    /// 固定为 5 星到未评分的顺序，空分组也会保留
    pub groups: Vec<RatingGroup>,
}

impl Default for LibraryView {
    fn default() -> Self {
        Self::build(Vec::new(), &HashMap::new())
    }
}

impl LibraryView {
    pub fn build(games: Vec<Game>, ratings: &HashMap<GameId, Rating>) -> Self {
        let mut groups: Vec<RatingGroup> = RatingBucket::ALL
            .iter()
            .map(|&bucket| RatingGroup {
                bucket,
                label: bucket.label(),
                entries: Vec::new(),
            })
            .collect();

        for game in games {
            let user_rating = ratings.get(&game.id).copied();
            let bucket = RatingBucket::for_rating(user_rating);
            if let Some(group) = groups.iter_mut().find(|g| g.bucket == bucket) {
                group.entries.push(LibraryEntry { game, user_rating });
            }
        }
        Self { groups }
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// 有游戏的分组
    pub fn non_empty_groups(&self) -> impl Iterator<Item = &RatingGroup> {
        self.groups.iter().filter(|g| !g.entries.is_empty())
    }

    /// 图表数据：(分组名称, 数量)
    pub fn chart(&self) -> Vec<(&'static str, usize)> {
        self.groups
            .iter()
            .map(|g| (g.label, g.entries.len()))
            .collect()
    }
}

pub struct LibraryPage {
    store: Arc<dyn DocumentStore>,
    session: Session,
}

impl LibraryPage {
    pub fn new(store: Arc<dyn DocumentStore>, session: Session) -> Self {
        Self { store, session }
    }

    /// 读取一次当前的游戏库，未登录时为空
    pub async fn load(&self) -> Result<LibraryView, AppError> {
        let Some(uid) = self.session.user_id() else {
            return Ok(LibraryView::default());
        };

        let docs = UserDocuments::new(&*self.store, &uid);
        let (games, ratings) = tokio::join!(docs.games(Collection::Library), docs.ratings());
        Ok(LibraryView::build(games?, &ratings?))
    }

    /// 实时订阅游戏库，未登录时返回 None
    pub fn feed(&self) -> Option<LibraryFeed> {
        let uid = self.session.user_id()?;
        Some(LibraryFeed {
            library: Subscription::new(self.store.clone(), &uid, Collection::Library),
            ratings: Subscription::new(self.store.clone(), &uid, Collection::Ratings),
            games: None,
            user_ratings: None,
        })
    }
}

enum FeedUpdate {
    Library(Option<Result<Vec<Document>, StoreError>>),
    Ratings(Option<Result<Vec<Document>, StoreError>>),
}

/// library 与 ratings 任一集合变化时重新生成 `LibraryView`
pub struct LibraryFeed {
    library: Subscription,
    ratings: Subscription,
    games: Option<Vec<Game>>,
    user_ratings: Option<HashMap<GameId, Rating>>,
}

impl LibraryFeed {
    /// 等待下一份视图；两个集合都读到首份快照后才开始产出
    pub async fn next(&mut self) -> Option<Result<LibraryView, StoreError>> {
        loop {
            let update = tokio::select! {
                snapshot = self.library.next() => FeedUpdate::Library(snapshot),
                snapshot = self.ratings.next() => FeedUpdate::Ratings(snapshot),
            };

            match update {
                FeedUpdate::Library(snapshot) => match snapshot? {
                    Ok(docs) => self.games = Some(games_from_documents(Collection::Library, &docs)),
                    Err(e) => return Some(Err(e)),
                },
                FeedUpdate::Ratings(snapshot) => match snapshot? {
                    Ok(docs) => self.user_ratings = Some(ratings_from_documents(&docs)),
                    Err(e) => return Some(Err(e)),
                },
            }

            if let (Some(games), Some(ratings)) = (&self.games, &self.user_ratings) {
                return Some(Ok(LibraryView::build(games.clone(), ratings)));
            }
        }
    }
}
