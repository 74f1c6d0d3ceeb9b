//! 登录会话
//!
//! `Session` 是显式传递给各个视图的身份句柄。登录状态通过 watch 通道推送，
//! 视图可以订阅状态变化，而不是在任意位置读取全局的“当前用户”。

use std::sync::Arc;
use tokio::sync::watch;

use super::{Account, AuthError, AuthService};
use crate::domain::User;

#[derive(Clone)]
pub struct Session {
    auth: Arc<dyn AuthService>,
    state: Arc<watch::Sender<Option<Account>>>,
}

impl Session {
    /// 未登录的会话
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            auth,
            state: Arc::new(state),
        }
    }

    /// 已登录的会话
    pub fn with_account(auth: Arc<dyn AuthService>, account: Account) -> Self {
        let session = Self::new(auth);
        session.state.send_replace(Some(account));
        session
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().as_ref().map(|a| a.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|a| a.user.uid.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// 订阅登录状态变化
    pub fn subscribe(&self) -> watch::Receiver<Option<Account>> {
        self.state.subscribe()
    }

    /// 注册新账号
    ///
    /// 注册成功后不自动登录，由调用方引导用户重新登录。
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let account = self.auth.sign_up(email, password).await?;
        log::info!("注册成功: {}", account.user.email);
        Ok(account.user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let account = self.auth.sign_in(email, password).await?;
        let user = account.user.clone();
        log::info!("登录成功: {}", user.email);
        self.state.send_replace(Some(account));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.state.send_replace(None) {
            log::info!("已退出登录: {}", previous.user.email);
        }
    }

    /// 修改展示名称，名称会被 trim，空名称会被拒绝
    pub async fn update_display_name(&self, name: &str) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("Name cannot be empty.".to_string()));
        }

        let account = self
            .state
            .borrow()
            .clone()
            .ok_or(AuthError::NotSignedIn)?;
        let updated = self.auth.update_display_name(&account, name).await?;

        // 请求期间可能已经切换账号，只更新同一用户
        self.state.send_if_modified(|state| match state {
            Some(current) if current.user.uid == updated.uid => {
                current.user.display_name = updated.display_name.clone();
                true
            }
            _ => false,
        });
        Ok(updated)
    }
}
