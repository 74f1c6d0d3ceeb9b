//! 数据目录解析
//!
//! 优先级：环境变量 `GAME_REVIEW_DATA_DIR` > 可执行文件旁的 `portable/` 目录 > 系统数据目录。

use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "GAME_REVIEW_DATA_DIR";
pub const PORTABLE_DIR: &str = "portable";
pub const DB_SUBDIR: &str = "data";
pub const DB_FILE_NAME: &str = "game_review.db";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 数据目录的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    Env,
    Portable,
    System,
}

/// 解析当前进程使用的数据目录
pub fn resolve_data_dir() -> Result<(PathBuf, DataLocation), String> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_with(std::env::var(DATA_DIR_ENV).ok(), exe_dir.as_deref())
}

fn resolve_with(
    env_value: Option<String>,
    exe_dir: Option<&Path>,
) -> Result<(PathBuf, DataLocation), String> {
    if let Some(dir) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok((PathBuf::from(dir), DataLocation::Env));
    }

    // 便携模式：可执行文件旁存在 portable 目录
    if let Some(portable) = exe_dir.map(|dir| dir.join(PORTABLE_DIR)) {
        if portable.is_dir() {
            return Ok((portable, DataLocation::Portable));
        }
    }

    Ok((system_data_dir()?, DataLocation::System))
}

/// 系统数据目录（跨平台）
fn system_data_dir() -> Result<PathBuf, String> {
    use directories::ProjectDirs;

    let dirs = ProjectDirs::from("dev", "gamereview", "game-review")
        .ok_or_else(|| "无法获取系统目录信息".to_string())?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf, String> {
    resolve_data_dir().map(|(dir, _)| dir)
}

/// 数据库文件路径
pub fn db_path() -> Result<PathBuf, String> {
    Ok(data_dir()?.join(DB_SUBDIR).join(DB_FILE_NAME))
}

/// 配置文件路径
pub fn config_path() -> Result<PathBuf, String> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_dir_wins() {
        let (dir, location) = resolve_with(Some("/tmp/reviews".to_string()), None).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/reviews"));
        assert_eq!(location, DataLocation::Env);
    }

    #[test]
    fn test_portable_dir_next_to_executable() {
        let exe_dir = std::env::temp_dir().join(format!("review-path-{}", std::process::id()));
        std::fs::create_dir_all(exe_dir.join(PORTABLE_DIR)).unwrap();

        let (dir, location) = resolve_with(Some("  ".to_string()), Some(&exe_dir)).unwrap();
        assert_eq!(location, DataLocation::Portable);
        assert!(dir.ends_with(PORTABLE_DIR));

        std::fs::remove_dir_all(&exe_dir).unwrap();
    }
}
