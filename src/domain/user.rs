use serde::{Deserialize, Serialize};

/// 认证服务中的用户身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl User {
    /// 展示名称，未设置时为 "User"
    pub fn display_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "User",
        }
    }

    /// 头像字母：优先取展示名称首字母，其次取邮箱首字母
    pub fn initial(&self) -> Option<char> {
        self.display_name
            .as_deref()
            .and_then(|name| name.trim().chars().next())
            .or_else(|| self.email.chars().next())
            .map(|c| c.to_ascii_uppercase())
    }
}
