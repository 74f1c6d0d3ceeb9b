//! 应用配置
//!
//! 配置保存在数据目录下的 `config.json`，文件不存在时使用默认值；
//! API key 等敏感项可以通过环境变量覆盖。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

pub const ENV_CATALOG_KEY: &str = "RAWG_API_KEY";
pub const ENV_CATALOG_URL: &str = "GAME_REVIEW_CATALOG_URL";
pub const ENV_AUTH_KEY: &str = "GAME_REVIEW_AUTH_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    /// 每页条数，None 时使用 API 默认值
    pub page_size: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.rawg.io/api".to_string(),
            api_key: String::new(),
            page_size: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 15,
        }
    }
}

/// 文档存储后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// 仅保存在内存中，进程退出即丢失
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// 自定义数据库路径，None 时使用数据目录下的默认路径
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub search: SearchConfig,
    /// 初始日志级别，运行时可通过 `set_log_level` 调整
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            auth: AuthConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// 从默认配置文件加载并应用环境变量覆盖
    pub fn load() -> Result<Self, AppError> {
        let path = review_path::config_path().map_err(AppError::Config)?;
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 读取配置文件，文件不存在时返回默认配置
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("配置文件不存在，使用默认配置: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("配置文件格式错误 {}: {}", path.display(), e)))
    }

    /// 写入配置文件（必要时创建目录）
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("配置序列化失败: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 使用环境变量覆盖配置项
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_CATALOG_KEY) {
            log::info!("{} 已设置，覆盖目录 API key", ENV_CATALOG_KEY);
            self.catalog.api_key = key;
        }
        if let Some(url) = non_empty(ENV_CATALOG_URL) {
            log::info!("{} 已设置，使用目录地址: {}", ENV_CATALOG_URL, url);
            self.catalog.base_url = url;
        }
        if let Some(key) = non_empty(ENV_AUTH_KEY) {
            log::info!("{} 已设置，覆盖认证 API key", ENV_AUTH_KEY);
            self.auth.api_key = key;
        }

        if self.catalog.api_key.is_empty() {
            log::warn!("目录 API key 未配置，请求可能被拒绝");
        }
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> Result<PathBuf, AppError> {
        match &self.store.db_path {
            Some(path) => Ok(path.clone()),
            None => review_path::db_path().map_err(AppError::Config),
        }
    }
}
