//! 目录 API 的原始响应结构
//!
//! 响应先按原始结构严格反序列化，再经过校验转换为领域结构；
//! 必填字段缺失或取值越界时整条记录判定为无效，不做静默兜底。

use serde::Deserialize;

use super::CatalogError;
use crate::domain::{Category, Game, GameDetails, NO_DESCRIPTION};

/// 分页响应外壳
#[derive(Debug, Deserialize)]
pub struct RawPage<T> {
    #[serde(default)]
    pub count: Option<u64>,
    /// 下一页 URL，最后一页为 null
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct RawNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPlatformEntry {
    pub platform: RawNamed,
}

/// 列表中的游戏条目
#[derive(Debug, Deserialize)]
pub struct RawGame {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub background_image: Option<String>,
    pub rating: f64,
    /// 部分条目的平台字段为 null
    #[serde(default)]
    pub platforms: Option<Vec<RawPlatformEntry>>,
    #[serde(default)]
    pub genres: Option<Vec<RawNamed>>,
    #[serde(default)]
    pub description_raw: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawGenre {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image_background: Option<String>,
}

/// 详情接口的游戏结构
#[derive(Debug, Deserialize)]
pub struct RawGameDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    pub rating: f64,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub genres: Vec<RawNamed>,
    #[serde(default)]
    pub platforms: Option<Vec<RawPlatformEntry>>,
    #[serde(default)]
    pub developers: Vec<RawNamed>,
    #[serde(default)]
    pub publishers: Vec<RawNamed>,
}

fn validate_name(id: u64, name: &str) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Invalid(format!("game {} has an empty name", id)));
    }
    Ok(trimmed.to_string())
}

fn validate_rating(id: u64, rating: f64) -> Result<f64, CatalogError> {
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err(CatalogError::Invalid(format!(
            "game {} has rating {} outside 0-5",
            id, rating
        )));
    }
    Ok(rating)
}

fn platform_names(platforms: Option<Vec<RawPlatformEntry>>) -> Vec<String> {
    platforms
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.platform.name)
        .collect()
}

fn names(items: Vec<RawNamed>) -> Vec<String> {
    items.into_iter().map(|n| n.name).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl TryFrom<RawGame> for Game {
    type Error = CatalogError;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        Ok(Game {
            id: raw.id,
            title: validate_name(raw.id, &raw.name)?,
            image_url: non_empty(raw.background_image),
            description: non_empty(raw.description_raw)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            rating: validate_rating(raw.id, raw.rating)?,
            platforms: platform_names(raw.platforms),
            genre: raw
                .genres
                .and_then(|genres| genres.into_iter().next())
                .map(|g| g.name),
        })
    }
}

impl TryFrom<RawGenre> for Category {
    type Error = CatalogError;

    fn try_from(raw: RawGenre) -> Result<Self, Self::Error> {
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Invalid(format!(
                "genre {} has an empty name",
                raw.id
            )));
        }
        Ok(Category {
            id: raw.id,
            name: name.to_string(),
            image_url: non_empty(raw.image_background),
        })
    }
}

impl TryFrom<RawGameDetails> for GameDetails {
    type Error = CatalogError;

    fn try_from(raw: RawGameDetails) -> Result<Self, Self::Error> {
        Ok(GameDetails {
            id: raw.id,
            name: validate_name(raw.id, &raw.name)?,
            description: non_empty(raw.description_raw)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            background_image: non_empty(raw.background_image),
            rating: validate_rating(raw.id, raw.rating)?,
            released: non_empty(raw.released),
            genres: names(raw.genres),
            platforms: platform_names(raw.platforms),
            developers: names(raw.developers),
            publishers: names(raw.publishers),
        })
    }
}

/// 解析一页游戏列表，任意条目无效则整页失败
pub fn decode_game_page(body: &[u8]) -> Result<(Vec<Game>, bool, Option<u64>), CatalogError> {
    let page: RawPage<RawGame> = serde_json::from_slice(body)?;
    let games = page
        .results
        .into_iter()
        .map(Game::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((games, page.next.is_some(), page.count))
}

pub fn decode_genres(body: &[u8]) -> Result<Vec<Category>, CatalogError> {
    let page: RawPage<RawGenre> = serde_json::from_slice(body)?;
    page.results.into_iter().map(Category::try_from).collect()
}

pub fn decode_details(body: &[u8]) -> Result<GameDetails, CatalogError> {
    let raw: RawGameDetails = serde_json::from_slice(body)?;
    GameDetails::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_BODY: &str = r#"{
        "count": 2,
        "next": "https://api.rawg.io/api/games?page=2",
        "previous": null,
        "results": [
            {
                "id": 3498,
                "slug": "grand-theft-auto-v",
                "name": "Grand Theft Auto V",
                "background_image": "https://media.rawg.io/gta.jpg",
                "rating": 4.47,
                "platforms": [
                    {"platform": {"id": 4, "name": "PC"}},
                    {"platform": {"id": 18, "name": "PlayStation 4"}}
                ],
                "genres": [{"id": 4, "name": "Action"}]
            },
            {
                "id": 58175,
                "name": "God of War",
                "background_image": null,
                "rating": 4.56,
                "platforms": null
            }
        ]
    }"#;

    #[test]
    fn test_decode_game_page_flattens_platforms() {
        let (games, has_next, count) = decode_game_page(LIST_BODY.as_bytes()).unwrap();
        assert!(has_next);
        assert_eq!(count, Some(2));
        assert_eq!(games.len(), 2);

        assert_eq!(games[0].platforms, vec!["PC", "PlayStation 4"]);
        assert_eq!(games[0].genre.as_deref(), Some("Action"));
        assert_eq!(games[0].description, NO_DESCRIPTION);

        assert!(games[1].image_url.is_none());
        assert!(games[1].platforms.is_empty());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let body = r#"{"count": 0, "next": null, "results": []}"#;
        let (games, has_next, _) = decode_game_page(body.as_bytes()).unwrap();
        assert!(games.is_empty());
        assert!(!has_next);
    }

    #[test]
    fn test_missing_required_field_fails_closed() {
        let body = r#"{"next": null, "results": [{"id": 1, "rating": 3.0}]}"#;
        assert!(matches!(
            decode_game_page(body.as_bytes()),
            Err(CatalogError::Decode(_))
        ));

        let body = r#"{"next": null, "results": [{"id": 1, "name": "X", "rating": 7.5}]}"#;
        assert!(matches!(
            decode_game_page(body.as_bytes()),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_decode_details() {
        let body = r#"{
            "id": 28,
            "name": "Red Dead Redemption 2",
            "description": "<p>Cowboys.</p>",
            "description_raw": "Cowboys.",
            "background_image": "https://media.rawg.io/rdr2.jpg",
            "rating": 4.59,
            "released": "2018-10-26",
            "genres": [{"name": "Action"}],
            "platforms": [{"platform": {"name": "Xbox One"}}],
            "developers": [{"name": "Rockstar Games"}],
            "publishers": [{"name": "Rockstar Games"}]
        }"#;
        let details = decode_details(body.as_bytes()).unwrap();
        assert_eq!(details.description, "Cowboys.");
        assert_eq!(details.released.as_deref(), Some("2018-10-26"));
        assert_eq!(details.platforms, vec!["Xbox One"]);
        assert_eq!(details.developers, vec!["Rockstar Games"]);
    }

    #[test]
    fn test_decode_genres() {
        let body = r#"{"count": 1, "next": null, "results": [
            {"id": 4, "name": "Action", "slug": "action", "image_background": "https://media.rawg.io/a.jpg"}
        ]}"#;
        let genres = decode_genres(body.as_bytes()).unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Action");
    }
}
