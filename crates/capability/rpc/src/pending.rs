//! 进行中的调用表：id → 等待响应的 oneshot。

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::error::RpcError;
use crate::types::RpcResponse;

pub type CallOutcome = Result<RpcResponse, RpcError>;

/// 并发调用按 id 独立关联。
#[derive(Default)]
pub struct PendingCalls {
    calls: Mutex<HashMap<String, oneshot::Sender<CallOutcome>>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<CallOutcome>>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 登记调用，返回等待端。
    pub fn register(&self, id: impl Into<String>) -> oneshot::Receiver<CallOutcome> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(id.into(), tx);
        rx
    }

    /// 撤销调用（发布失败或超时）。
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// 投递结果；id 未登记时返回 false。
    pub fn resolve(&self, id: &str, outcome: CallOutcome) -> bool {
        let Some(tx) = self.lock().remove(id) else {
            return false;
        };
        // 等待方可能已超时放弃
        let _ = tx.send(outcome);
        true
    }

    /// 以 `Channel` 错误结束全部进行中的调用，返回数量。
    pub fn fail_all(&self, reason: &str) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(RpcError::Channel(reason.to_string())));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
