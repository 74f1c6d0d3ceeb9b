//! 远端状态镜像
//!
//! 本地字段先乐观更新，再写入文档存储；写入失败时恢复为操作前的值。
//! 写入进行中时 `pending` 为 true，期间的重复操作会被忽略。
//! 每次写入的开始和结束都会推进 `epoch`；与写入有重叠的读取结果会被丢弃。

use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;

use crate::store::StoreError;

/// 与远端文档对应的本地字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Mirrored<T> {
    pub value: T,
    /// 写入进行中
    pub pending: bool,
    #[serde(skip)]
    epoch: u64,
}

impl<T> Mirrored<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            pending: false,
            epoch: 0,
        }
    }

    /// 读取开始前记录，读取完成后交给 `sync_since`
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// 读取结果只在没有进行中的写入时覆盖本地值
    pub fn sync(&mut self, value: T) {
        if !self.pending {
            self.value = value;
        }
    }

    /// 读取期间没有发生过写入时才覆盖本地值
    ///
    /// 返回是否已覆盖。
    pub fn sync_since(&mut self, epoch: u64, value: T) -> bool {
        if self.pending || self.epoch != epoch {
            return false;
        }
        self.value = value;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// 已有写入进行中，本次操作被忽略
    Skipped,
}

/// 乐观写入
///
/// `write` 在本地值更新之后才会被 await；锁不会跨越 await 持有。
pub(crate) async fn optimistic<S, T, W>(
    state: &Mutex<S>,
    field: fn(&mut S) -> &mut Mirrored<T>,
    next: T,
    write: W,
) -> Result<WriteOutcome, StoreError>
where
    W: Future<Output = Result<(), StoreError>>,
{
    let previous = {
        let mut guard = state.lock();
        let slot = field(&mut guard);
        if slot.pending {
            return Ok(WriteOutcome::Skipped);
        }
        slot.pending = true;
        slot.epoch += 1;
        std::mem::replace(&mut slot.value, next)
    };

    let result = write.await;

    let mut guard = state.lock();
    let slot = field(&mut guard);
    slot.pending = false;
    slot.epoch += 1;
    match result {
        Ok(()) => Ok(WriteOutcome::Applied),
        Err(e) => {
            slot.value = previous;
            Err(e)
        }
    }
}
