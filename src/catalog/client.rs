use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::dto::{decode_details, decode_game_page, decode_genres};
use super::{Catalog, CatalogError, GamePage, GameQuery};
use crate::config::CatalogConfig;
use crate::domain::{Category, Game, GameDetails, GameId};

/// 基于 reqwest 的 RAWG 目录客户端
///
/// 所有请求都以查询参数 `key` 携带静态 API key。
#[derive(Debug, Clone)]
pub struct RawgClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RawgClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut base_url = Url::parse(&config.base_url)?;
        // join 需要以 / 结尾，否则最后一段路径会被替换
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// 游戏列表 URL
    pub fn games_url(&self, query: &GameQuery) -> Result<Url, CatalogError> {
        let mut url = self.endpoint("games")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.max(1).to_string());
            if let Some(size) = query.page_size {
                pairs.append_pair("page_size", &size.to_string());
            }
            if let Some(genre) = query.genre {
                pairs.append_pair("genres", &genre.to_string());
            }
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
        }
        Ok(url)
    }

    pub fn details_url(&self, id: GameId) -> Result<Url, CatalogError> {
        self.endpoint(&format!("games/{}", id))
    }

    pub fn genres_url(&self) -> Result<Url, CatalogError> {
        self.endpoint("genres")
    }

    pub fn trending_url(&self, limit: u32) -> Result<Url, CatalogError> {
        let mut url = self.endpoint("games/lists/main")?;
        url.query_pairs_mut()
            .append_pair("ordering", "-added")
            .append_pair("page_size", &limit.to_string());
        Ok(url)
    }

    async fn get_bytes(&self, url: Url) -> Result<(StatusCode, Vec<u8>), CatalogError> {
        log::debug!("GET {}", url.path());
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }

    async fn get_ok(&self, url: Url) -> Result<Vec<u8>, CatalogError> {
        let (status, body) = self.get_bytes(url).await?;
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        Ok(body)
    }
}

#[async_trait]
impl Catalog for RawgClient {
    async fn list_games(&self, query: &GameQuery) -> Result<GamePage, CatalogError> {
        let body = self.get_ok(self.games_url(query)?).await?;
        let (games, has_next, total) = decode_game_page(&body)?;
        Ok(GamePage {
            games,
            has_next,
            total,
        })
    }

    async fn game_details(&self, id: GameId) -> Result<GameDetails, CatalogError> {
        let (status, body) = self.get_bytes(self.details_url(id)?).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        decode_details(&body)
    }

    async fn genres(&self) -> Result<Vec<Category>, CatalogError> {
        let body = self.get_ok(self.genres_url()?).await?;
        decode_genres(&body)
    }

    async fn trending(&self, limit: u32) -> Result<Vec<Game>, CatalogError> {
        let body = self.get_ok(self.trending_url(limit)?).await?;
        let (games, _, _) = decode_game_page(&body)?;
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RawgClient {
        RawgClient::new(&CatalogConfig {
            base_url: "https://api.rawg.io/api".to_string(),
            api_key: "secret".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_games_url_carries_key_and_filters() {
        let query = GameQuery::page(2)
            .with_genre(Some(4))
            .with_search("Half Life");
        let url = client().games_url(&query).unwrap();

        assert_eq!(url.path(), "/api/games");
        assert_eq!(
            url.query(),
            Some("key=secret&page=2&genres=4&search=half+life")
        );
    }

    #[test]
    fn test_details_and_trending_urls() {
        let c = client();
        assert_eq!(
            c.details_url(3498).unwrap().as_str(),
            "https://api.rawg.io/api/games/3498?key=secret"
        );
        assert_eq!(
            c.trending_url(10).unwrap().as_str(),
            "https://api.rawg.io/api/games/lists/main?key=secret&ordering=-added&page_size=10"
        );
        assert_eq!(
            c.genres_url().unwrap().as_str(),
            "https://api.rawg.io/api/genres?key=secret"
        );
    }
}
