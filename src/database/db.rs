use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ==================== 数据库连接管理 ====================

/// Establish a SeaORM database connection.
pub async fn establish_connection(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // 1. 如果数据库不存在，创建目录
    if !db_path.exists() {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DbErr::Conn(RuntimeErr::Internal(format!("无法创建数据库目录: {}", e)))
            })?;
        }
        log::info!("首次启动，创建数据库: {}", db_path.display());
    } else {
        log::info!("使用数据库: {}", db_path.display());
    }

    // 2. 使用 `url` crate 安全地构建连接字符串
    let db_url = Url::from_file_path(db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;

    let connection_string = format!("sqlite:{}?mode=rwc", db_url.path());
    connect(connection_string).await
}

/// 建立内存数据库连接
///
/// 连接池大小固定为 1，保证所有查询访问同一个内存数据库。
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    connect("sqlite::memory:".to_string()).await
}

async fn connect(connection_string: String) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(connection_string);
    options
        .max_connections(1) // 对于本地 SQLite，连接池大小为 1 即可
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// 执行全部数据库迁移
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<(), DbErr> {
    log::info!("开始执行数据库迁移...");
    migration::Migrator::up(conn, None).await?;
    log::info!("数据库迁移完成");
    Ok(())
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("game_review.db");

        let conn = establish_connection(&db_path).await.unwrap();
        run_migrations(&conn).await.unwrap();
        assert!(db_path.exists());

        let row = conn
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name='documents'",
            ))
            .await
            .unwrap();
        assert!(row.is_some());

        // 迁移可重复执行
        run_migrations(&conn).await.unwrap();
        close_connection(conn).await.unwrap();
    }
}
