use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::domain::rating::InvalidRating;
use crate::store::StoreError;

/// 应用层统一错误
///
/// 各子系统保留各自的错误类型，在视图与命令层汇总为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    InvalidRating(#[from] InvalidRating),

    #[error("not signed in")]
    NotSignedIn,

    #[error("{0}")]
    InvalidInput(String),

    #[error("config: {0}")]
    Config(String),

    #[error("database: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
