//! 登录、注册表单与页头账号菜单

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::auth::{Account, Session};
use crate::domain::User;
use crate::error::AppError;
use crate::notify::Notifier;

struct Submitting<'a>(&'a Mutex<bool>);

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0.lock() = false;
    }
}

/// 登录 / 注册表单
pub struct AccountForms {
    session: Session,
    notifier: Notifier,
    submitting: Mutex<bool>,
}

impl AccountForms {
    pub fn new(session: Session, notifier: Notifier) -> Self {
        Self {
            session,
            notifier,
            submitting: Mutex::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        *self.submitting.lock()
    }

    /// 标记提交中；返回的守卫释放时（包括请求被取消）清除标记
    fn begin(&self) -> Option<Submitting<'_>> {
        let mut submitting = self.submitting.lock();
        if *submitting {
            return None;
        }
        *submitting = true;
        Some(Submitting(&self.submitting))
    }

    /// 注册成功后需要重新登录
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(guard) = self.begin() else {
            return Err(AppError::InvalidInput("sign up already in progress".to_string()));
        };
        let result = self.session.sign_up(email, password).await;
        drop(guard);

        match result {
            Ok(user) => {
                self.notifier
                    .success("Account created successfully! Please log in.");
                Ok(user)
            }
            Err(e) => {
                log::error!("注册失败: {}", e);
                self.notifier.error("Failed to sign up. Please try again.");
                Err(e.into())
            }
        }
    }

    pub async fn log_in(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(guard) = self.begin() else {
            return Err(AppError::InvalidInput("log in already in progress".to_string()));
        };
        let result = self.session.sign_in(email, password).await;
        drop(guard);

        match result {
            Ok(user) => {
                self.notifier.success("Login Successful!");
                Ok(user)
            }
            Err(e) => {
                log::error!("登录失败: {}", e);
                self.notifier
                    .error("Failed to log in. Please check your credentials.");
                Err(e.into())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderState {
    pub user: Option<User>,
    pub initial: Option<char>,
    pub dropdown_open: bool,
}

/// 页头：跟随会话推送的登录状态
pub struct Header {
    session: Session,
    notifier: Notifier,
    auth_state: watch::Receiver<Option<Account>>,
    dropdown_open: Mutex<bool>,
}

impl Header {
    pub fn new(session: Session, notifier: Notifier) -> Self {
        let auth_state = session.subscribe();
        Self {
            session,
            notifier,
            auth_state,
            dropdown_open: Mutex::new(false),
        }
    }

    pub fn snapshot(&self) -> HeaderState {
        let user = self.auth_state.borrow().as_ref().map(|a| a.user.clone());
        HeaderState {
            initial: user.as_ref().and_then(User::initial),
            dropdown_open: user.is_some() && *self.dropdown_open.lock(),
            user,
        }
    }

    /// 等待登录状态变化，会话关闭时返回 None
    pub async fn changed(&mut self) -> Option<HeaderState> {
        self.auth_state.changed().await.ok()?;
        if self.auth_state.borrow().is_none() {
            *self.dropdown_open.lock() = false;
        }
        Some(self.snapshot())
    }

    pub fn toggle_dropdown(&self) -> bool {
        if !self.session.is_signed_in() {
            return false;
        }
        let mut open = self.dropdown_open.lock();
        *open = !*open;
        *open
    }

    pub fn log_out(&self) {
        self.session.sign_out();
        *self.dropdown_open.lock() = false;
        self.notifier.success("Logged out successfully!");
    }
}
