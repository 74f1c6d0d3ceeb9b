//! 应用装配
//!
//! `AppState` 持有目录、文档存储、会话和提示句柄，并负责创建各个视图。
//! 视图之间不共享状态，只共享这些句柄。

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{IdentityToolkitAuth, Session};
use crate::catalog::{Catalog, RawgClient};
use crate::config::{AppConfig, StoreBackend};
use crate::database::SqliteDocumentStore;
use crate::database::db::{close_connection, establish_connection, run_migrations};
use crate::domain::{Game, GameId};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::{DocumentStore, MemoryDocumentStore};
use crate::utils::logs::init_logging;
use crate::views::{
    AccountForms, Categories, GameCard, GameDetailsPage, GameGrid, Header, LibraryPage,
    ProfilePage, SearchBar, StarRating, Trending,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn Catalog>,
    pub store: Arc<dyn DocumentStore>,
    pub session: Session,
    pub notifier: Notifier,
    db: Option<DatabaseConnection>,
}

impl AppState {
    /// 从默认配置文件启动
    pub async fn init() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        init_logging(&config.log_level).map_err(AppError::Config)?;
        Self::from_config(config).await
    }

    /// 按配置创建目录客户端、认证客户端和文档存储（不初始化日志）
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let catalog: Arc<dyn Catalog> = Arc::new(RawgClient::new(&config.catalog)?);
        let session = Session::new(Arc::new(IdentityToolkitAuth::new(&config.auth)?));

        let (store, db) = match config.store.backend {
            StoreBackend::Sqlite => {
                let db_path = config.db_path()?;
                let conn = establish_connection(&db_path).await?;
                run_migrations(&conn).await?;
                let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(conn.clone()));
                (store, Some(conn))
            }
            StoreBackend::Memory => {
                log::warn!("使用内存文档存储，退出后数据不会保留");
                let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
                (store, None)
            }
        };

        log::info!("应用初始化完成");
        Ok(Self {
            config: Arc::new(config),
            catalog,
            store,
            session,
            notifier: Notifier::new(),
            db,
        })
    }

    /// 使用现成的组件装配（测试或嵌入时使用）
    pub fn with_parts(
        config: AppConfig,
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn DocumentStore>,
        session: Session,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            store,
            session,
            notifier: Notifier::new(),
            db: None,
        }
    }

    pub fn game_card(&self, game: Game) -> GameCard {
        GameCard::new(
            game,
            self.store.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn game_grid(&self) -> GameGrid {
        GameGrid::new(
            self.catalog.clone(),
            self.notifier.clone(),
            self.config.catalog.page_size,
        )
    }

    pub fn search_bar(&self) -> SearchBar {
        SearchBar::new(
            self.catalog.clone(),
            self.notifier.clone(),
            self.config.search.debounce(),
        )
    }

    pub fn star_rating(&self, game_id: GameId) -> StarRating {
        StarRating::new(
            game_id,
            self.store.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn game_details(&self, game_id: GameId) -> GameDetailsPage {
        GameDetailsPage::new(
            game_id,
            self.catalog.clone(),
            self.store.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn library_page(&self) -> LibraryPage {
        LibraryPage::new(self.store.clone(), self.session.clone())
    }

    pub fn profile_page(&self) -> ProfilePage {
        ProfilePage::new(
            self.store.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn categories(&self) -> Categories {
        Categories::new(self.catalog.clone())
    }

    pub fn trending(&self) -> Trending {
        Trending::new(self.catalog.clone())
    }

    pub fn account_forms(&self) -> AccountForms {
        AccountForms::new(self.session.clone(), self.notifier.clone())
    }

    pub fn header(&self) -> Header {
        Header::new(self.session.clone(), self.notifier.clone())
    }

    /// 关闭数据库连接
    pub async fn shutdown(self) -> Result<(), AppError> {
        if let Some(db) = self.db {
            close_connection(db).await?;
            log::info!("数据库连接已关闭");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::store::Collection;
    use crate::testing::{FakeAuth, FakeCatalog, games};

    #[tokio::test]
    async fn test_sqlite_backend_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            store: StoreConfig {
                backend: StoreBackend::Sqlite,
                db_path: Some(dir.path().join("game_review.db")),
            },
            ..Default::default()
        };

        let app = AppState::from_config(config.clone()).await.unwrap();
        app.store
            .set("u1", Collection::Library, "3", serde_json::json!({"title": "Portal"}))
            .await
            .unwrap();
        app.shutdown().await.unwrap();

        let reopened = AppState::from_config(config).await.unwrap();
        let doc = reopened.store.get("u1", Collection::Library, "3").await.unwrap();
        assert_eq!(doc.unwrap().body["title"], "Portal");
        reopened.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_views_share_session_and_store() {
        let session = Session::with_account(Arc::new(FakeAuth::new()), FakeAuth::account("u1"));
        let app = AppState::with_parts(
            AppConfig::default(),
            Arc::new(FakeCatalog::new(games(1..=3))),
            Arc::new(MemoryDocumentStore::new()),
            session,
        );

        let grid = app.game_grid();
        grid.load_first().await.unwrap();
        let first = grid.snapshot().games[0].clone();

        app.game_card(first.clone()).add_to_library().await.unwrap();
        let library = app.library_page().load().await.unwrap();
        assert_eq!(library.total(), 1);

        app.header().log_out();
        assert!(app.library_page().load().await.unwrap().is_empty());
    }
}
