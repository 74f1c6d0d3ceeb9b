//! 提示消息（toast）
//!
//! 视图通过 `Notifier` 发出短暂的成功/失败提示，UI 层订阅后展示。

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const TOAST_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(TOAST_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(ToastKind::Error, message.into());
    }

    fn emit(&self, kind: ToastKind, message: String) {
        log::debug!("toast [{:?}]: {}", kind, message);
        // 没有订阅者时提示直接丢弃
        let _ = self.sender.send(Toast { kind, message });
    }
}
