//! Identity Toolkit REST 认证实现
//!
//! 使用 `accounts:signUp`、`accounts:signInWithPassword`、`accounts:update` 三个接口，
//! 所有请求以查询参数 `key` 携带 API key。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{Account, AuthError, AuthService, validate_credentials};
use crate::config::AuthConfig;
use crate::domain::User;

pub struct IdentityToolkitAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl AccountResponse {
    fn into_user(self) -> User {
        User {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|n| !n.is_empty()),
        }
    }

    fn into_account(mut self) -> Result<Account, AuthError> {
        let id_token = self
            .id_token
            .take()
            .ok_or_else(|| AuthError::Rejected("response is missing idToken".to_string()))?;
        Ok(Account {
            user: self.into_user(),
            id_token,
        })
    }
}

impl IdentityToolkitAuth {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// 接口 URL，例如 `{base}/accounts:signUp?key=...`
    pub fn endpoint(&self, action: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}/accounts:{}", self.base_url, action))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<AccountResponse, AuthError> {
        let response = self
            .client
            .post(self.endpoint(action)?)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        parse_response(status.as_u16(), &bytes)
    }
}

/// 解析认证接口响应；失败时优先提取服务端返回的错误代码（如 EMAIL_EXISTS）
fn parse_response(status: u16, body: &[u8]) -> Result<AccountResponse, AuthError> {
    if (200..300).contains(&status) {
        return Ok(serde_json::from_slice(body)?);
    }
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => Err(AuthError::Rejected(envelope.error.message)),
        Err(_) => Err(AuthError::Status(status)),
    }
}

#[async_trait]
impl AuthService for IdentityToolkitAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        validate_credentials(email, password)?;
        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        self.post("signUp", &request).await?.into_account()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        validate_credentials(email, password)?;
        let request = PasswordRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        self.post("signInWithPassword", &request)
            .await?
            .into_account()
    }

    async fn update_display_name(
        &self,
        account: &Account,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let request = UpdateRequest {
            id_token: &account.id_token,
            display_name,
            return_secure_token: false,
        };
        let mut user = self.post("update", &request).await?.into_user();
        // update 接口不一定返回 displayName
        if user.display_name.is_none() {
            user.display_name = Some(display_name.to_string());
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_colon_action() {
        let auth = IdentityToolkitAuth::new(&AuthConfig {
            api_key: "k".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            auth.endpoint("signInWithPassword").unwrap().as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=k"
        );
    }

    #[test]
    fn test_parse_success_response() {
        let body = br#"{"localId":"abc","email":"a@b.c","idToken":"tok","displayName":""}"#;
        let account = parse_response(200, body).unwrap().into_account().unwrap();
        assert_eq!(account.user.uid, "abc");
        assert_eq!(account.user.display_name, None);
        assert_eq!(account.id_token, "tok");
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = br#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        assert!(matches!(
            parse_response(400, body),
            Err(AuthError::Rejected(msg)) if msg == "EMAIL_EXISTS"
        ));
        assert!(matches!(
            parse_response(503, b"<html>"),
            Err(AuthError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_before_request() {
        let auth = IdentityToolkitAuth::new(&AuthConfig::default()).unwrap();
        assert!(matches!(
            auth.sign_in(" ", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
    }
}
