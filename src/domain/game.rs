//! 游戏与分类数据结构
//!
//! `Game` 同时是目录列表的展示结构和 library / favorites 文档的存储结构，
//! 存储时字段使用 camelCase，与已有的用户文档保持兼容。

use serde::{Deserialize, Serialize};

/// 目录 API 中的游戏 ID
pub type GameId = u64;

/// 目录 API 中的分类（genre）ID
pub type CategoryId = u64;

/// 目录未提供简介时的占位文本
pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub title: String,
    /// 封面图片 URL
    #[serde(default)]
    pub image_url: Option<String>,
    pub description: String,
    /// 目录评分（0–5）
    pub rating: f64,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl Game {
    /// 文档 key：游戏 ID 的字符串形式
    pub fn doc_id(&self) -> String {
        self.id.to_string()
    }

    /// 平台列表的展示文本
    pub fn platform_label(&self) -> String {
        if self.platforms.is_empty() {
            "Unknown Platforms".to_string()
        } else {
            self.platforms.join(", ")
        }
    }
}

/// 游戏分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 游戏详情（详情页使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub id: GameId,
    pub name: String,
    pub description: String,
    pub background_image: Option<String>,
    pub rating: f64,
    /// 发售日期，格式与目录一致（YYYY-MM-DD）
    pub released: Option<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
}

impl GameDetails {
    /// 转换为可写入用户集合的 `Game`
    pub fn to_game(&self) -> Game {
        Game {
            id: self.id,
            title: self.name.clone(),
            image_url: self.background_image.clone(),
            description: self.description.clone(),
            rating: self.rating,
            platforms: self.platforms.clone(),
            genre: self.genres.first().cloned(),
        }
    }

    /// 评分展示文本，未评分时为 "N/A"
    pub fn rating_label(&self) -> String {
        if self.rating > 0.0 {
            format!("{}/5", self.rating)
        } else {
            "N/A".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_game_uses_camel_case() {
        let game = Game {
            id: 3498,
            title: "Grand Theft Auto V".to_string(),
            image_url: Some("https://media.rawg.io/gta.jpg".to_string()),
            description: NO_DESCRIPTION.to_string(),
            rating: 4.47,
            platforms: vec!["PC".to_string()],
            genre: None,
        };

        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["imageUrl"], "https://media.rawg.io/gta.jpg");
        assert!(value.get("genre").is_none());
    }

    #[test]
    fn test_details_to_game_takes_first_genre() {
        let details: GameDetails = serde_json::from_value(json!({
            "id": 28,
            "name": "Red Dead Redemption 2",
            "description": "Cowboys.",
            "backgroundImage": null,
            "rating": 0.0,
            "released": "2018-10-26",
            "genres": ["Action", "Adventure"],
            "platforms": ["PlayStation 4"],
            "developers": ["Rockstar Games"],
            "publishers": []
        }))
        .unwrap();

        let game = details.to_game();
        assert_eq!(game.title, "Red Dead Redemption 2");
        assert_eq!(game.genre.as_deref(), Some("Action"));
        assert_eq!(details.rating_label(), "N/A");
    }
}
