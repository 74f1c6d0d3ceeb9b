//! 认证服务
//!
//! 认证由外部服务负责，应用只通过 `AuthService` 调用邮箱密码注册、登录和
//! 修改展示名称，并通过 `Session` 观察当前登录状态。

pub mod identity_toolkit;
pub mod session;

use async_trait::async_trait;

use crate::domain::User;

pub use identity_toolkit::IdentityToolkitAuth;
pub use session::Session;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("auth service rejected the request: {0}")]
    Rejected(String),
    #[error("auth service responded with status {0}")]
    Status(u16),
    #[error("malformed auth response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid auth url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("not signed in")]
    NotSignedIn,
}

/// 登录后的账号：用户身份与调用认证服务所需的 ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: User,
    pub id_token: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// 修改展示名称，返回更新后的用户
    async fn update_display_name(
        &self,
        account: &Account,
        display_name: &str,
    ) -> Result<User, AuthError>;
}

/// 校验邮箱和密码均非空
pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput(
            "email and password are required".to_string(),
        ));
    }
    Ok(())
}
