//! 测试用的目录、认证与存储实现

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::auth::{Account, AuthError, AuthService, Session};
use crate::catalog::{Catalog, CatalogError, GamePage, GameQuery};
use crate::domain::{Category, CategoryId, Game, GameDetails, GameId, User};
use crate::notify::Notifier;
use crate::store::{
    ChangeEvent, Collection, Document, DocumentStore, MemoryDocumentStore, StoreError,
    UserDocuments,
};
use tokio::sync::broadcast;

pub fn game(id: GameId) -> Game {
    Game {
        id,
        title: format!("Game {}", id),
        image_url: Some(format!("https://media.example/{}.jpg", id)),
        description: "A game.".to_string(),
        rating: 4.0,
        platforms: vec!["PC".to_string()],
        genre: None,
    }
}

pub fn games(ids: impl IntoIterator<Item = GameId>) -> Vec<Game> {
    ids.into_iter().map(game).collect()
}

pub fn details(id: GameId) -> GameDetails {
    GameDetails {
        id,
        name: format!("Game {}", id),
        description: "Long description.".to_string(),
        background_image: None,
        rating: 4.2,
        released: Some("2020-01-01".to_string()),
        genres: vec!["Action".to_string()],
        platforms: vec!["PC".to_string()],
        developers: vec![],
        publishers: vec![],
    }
}

pub struct FakeCatalog {
    games: Vec<Game>,
    page_size: usize,
    by_genre: HashMap<CategoryId, Vec<Game>>,
    genres: Vec<Category>,
    details: HashMap<GameId, GameDetails>,
    scripted_pages: Mutex<HashMap<u32, GamePage>>,
    failing_pages: Mutex<HashSet<u32>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    genre_delays: Mutex<HashMap<CategoryId, Duration>>,
    failing: AtomicBool,
    queries: Mutex<Vec<GameQuery>>,
}

impl FakeCatalog {
    pub fn new(games: Vec<Game>) -> Self {
        Self {
            games,
            page_size: 20,
            by_genre: HashMap::new(),
            genres: Vec::new(),
            details: HashMap::new(),
            scripted_pages: Mutex::new(HashMap::new()),
            failing_pages: Mutex::new(HashSet::new()),
            search_delays: Mutex::new(HashMap::new()),
            genre_delays: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn genre(mut self, id: CategoryId, name: &str, games: Vec<Game>) -> Self {
        self.genres.push(Category {
            id,
            name: name.to_string(),
            image_url: None,
        });
        self.by_genre.insert(id, games);
        self
    }

    pub fn with_details(mut self, details: GameDetails) -> Self {
        self.details.insert(details.id, details);
        self
    }

    /// 指定某一页的返回内容（忽略过滤条件）
    pub fn script_page(&self, page: u32, result: GamePage) {
        self.scripted_pages.lock().insert(page, result);
    }

    pub fn fail_page(&self, page: u32, fail: bool) {
        let mut pages = self.failing_pages.lock();
        if fail {
            pages.insert(page);
        } else {
            pages.remove(&page);
        }
    }

    pub fn delay_search(&self, term: &str, delay: Duration) {
        self.search_delays.lock().insert(term.to_string(), delay);
    }

    pub fn delay_genre(&self, genre: CategoryId, delay: Duration) {
        self.genre_delays.lock().insert(genre, delay);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<GameQuery> {
        self.queries.lock().clone()
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Status(500));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_games(&self, query: &GameQuery) -> Result<GamePage, CatalogError> {
        self.queries.lock().push(query.clone());

        let delay = query
            .search
            .as_ref()
            .and_then(|term| self.search_delays.lock().get(term).copied())
            .or_else(|| {
                query
                    .genre
                    .and_then(|genre| self.genre_delays.lock().get(&genre).copied())
            });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check()?;
        if self.failing_pages.lock().contains(&query.page) {
            return Err(CatalogError::Status(502));
        }
        if let Some(page) = self.scripted_pages.lock().get(&query.page) {
            return Ok(page.clone());
        }

        let source = match query.genre {
            Some(genre) => self.by_genre.get(&genre).cloned().unwrap_or_default(),
            None => self.games.clone(),
        };
        let filtered: Vec<Game> = match &query.search {
            Some(term) => source
                .into_iter()
                .filter(|g| g.title.to_lowercase().contains(term.as_str()))
                .collect(),
            None => source,
        };

        let size = query.page_size.map(|s| s as usize).unwrap_or(self.page_size);
        let start = (query.page.saturating_sub(1) as usize) * size;
        let end = (start + size).min(filtered.len());
        let games = filtered.get(start..end).map(|s| s.to_vec()).unwrap_or_default();
        Ok(GamePage {
            games,
            has_next: end < filtered.len(),
            total: Some(filtered.len() as u64),
        })
    }

    async fn game_details(&self, id: GameId) -> Result<GameDetails, CatalogError> {
        self.check()?;
        self.details
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn genres(&self) -> Result<Vec<Category>, CatalogError> {
        self.check()?;
        Ok(self.genres.clone())
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Game>, CatalogError> {
        self.check()?;
        Ok(self.games.iter().take(limit as usize).cloned().collect())
    }
}

pub struct FakeAuth {
    failing: AtomicBool,
    delay: Mutex<Duration>,
}

impl Default for FakeAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAuth {
    pub fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 每次请求在返回前等待的时间
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn account(uid: &str) -> Account {
        Account {
            user: User {
                uid: uid.to_string(),
                email: format!("{}@example.com", uid),
                display_name: None,
            },
            id_token: format!("token-{}", uid),
        }
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected("INVALID_LOGIN_CREDENTIALS".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        crate::auth::validate_credentials(email, password)?;
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        let mut account = Self::account(&format!("uid-{}", email));
        account.user.email = email.to_string();
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        self.sign_up(email, password).await
    }

    async fn update_display_name(
        &self,
        account: &Account,
        display_name: &str,
    ) -> Result<User, AuthError> {
        self.check()?;
        let mut user = account.user.clone();
        user.display_name = Some(display_name.to_string());
        Ok(user)
    }
}

/// 读取先取得当时的数据，再等待 `delay` 才返回；写入不受影响
pub struct SlowReads {
    pub inner: Arc<MemoryDocumentStore>,
    pub delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowReads {
    async fn get(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let doc = self.inner.get(user_id, collection, doc_id).await;
        tokio::time::sleep(self.delay).await;
        doc
    }

    async fn list(
        &self,
        user_id: &str,
        collection: Collection,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.inner.list(user_id, collection).await;
        tokio::time::sleep(self.delay).await;
        docs
    }

    async fn set(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
        body: Value,
    ) -> Result<(), StoreError> {
        self.inner.set(user_id, collection, doc_id, body).await
    }

    async fn delete(
        &self,
        user_id: &str,
        collection: Collection,
        doc_id: &str,
    ) -> Result<(), StoreError> {
        self.inner.delete(user_id, collection, doc_id).await
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.changes()
    }
}

/// 视图测试共用的存储、会话与提示
pub struct Fixture {
    pub store: Arc<MemoryDocumentStore>,
    pub session: Session,
    pub notifier: Notifier,
}

impl Fixture {
    pub fn signed_in() -> Self {
        Self {
            store: Arc::new(MemoryDocumentStore::new()),
            session: Session::with_account(Arc::new(FakeAuth::new()), FakeAuth::account("u1")),
            notifier: Notifier::new(),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            store: Arc::new(MemoryDocumentStore::new()),
            session: Session::new(Arc::new(FakeAuth::new())),
            notifier: Notifier::new(),
        }
    }

    pub fn docs(&self) -> UserDocuments<'_> {
        UserDocuments::new(&*self.store, "u1")
    }
}
