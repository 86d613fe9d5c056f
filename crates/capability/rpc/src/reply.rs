//! 响应帧分发与故障边界。
//!
//! 响应解码与观察者回调都在 `catch_unwind` 内执行：
//! panic 转为对应调用的 `RpcError::Fault`，无法关联时只记录日志，
//! 驱动任务本身不会因此退出。

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, error, warn};

use crate::error::RpcError;
use crate::pending::{CallOutcome, PendingCalls};
use crate::types::{ChannelEvent, ChannelObserver, ReplyFrame, RpcResponse};

#[derive(serde::Deserialize)]
struct FrameId {
    id: String,
}

/// 将响应帧的 `data`/`error` 解码为调用结果。
pub fn decode_envelope(data: Option<serde_json::Value>, error: Option<String>) -> CallOutcome {
    match (error, data) {
        (Some(message), _) => Err(RpcError::Remote(message)),
        (None, Some(data)) => serde_json::from_value::<RpcResponse>(data)
            .map_err(|err| RpcError::Decode(err.to_string())),
        (None, None) => Err(RpcError::Decode(
            "reply carries neither data nor error".to_string(),
        )),
    }
}

/// 分发一条响应帧。
pub fn route_reply(pending: &PendingCalls, payload: &[u8]) {
    route_reply_with(pending, payload, decode_envelope);
}

/// 使用指定解码器分发响应帧。
pub fn route_reply_with<F>(pending: &PendingCalls, payload: &[u8], decode: F)
where
    F: FnOnce(Option<serde_json::Value>, Option<String>) -> CallOutcome,
{
    let frame = match catch_unwind(AssertUnwindSafe(|| {
        serde_json::from_slice::<ReplyFrame>(payload)
    })) {
        Ok(Ok(frame)) => frame,
        Ok(Err(err)) => {
            // 帧结构不符但 id 可读时，让对应调用立即以解码错误结束
            match serde_json::from_slice::<FrameId>(payload) {
                Ok(FrameId { id }) => {
                    warn!(target: "radius.rpc", call_id = %id, error = %err, "rpc_reply_malformed");
                    pending.resolve(&id, Err(RpcError::Decode(err.to_string())));
                }
                Err(_) => warn!(target: "radius.rpc", error = %err, "rpc_reply_unparsable"),
            }
            return;
        }
        Err(panic) => {
            error!(target: "radius.rpc", fault = %panic_message(&*panic), "rpc_reply_fault");
            return;
        }
    };

    let ReplyFrame { id, data, error } = frame;
    let outcome = catch_unwind(AssertUnwindSafe(|| decode(data, error)))
        .unwrap_or_else(|panic| Err(RpcError::Fault(panic_message(&*panic))));
    if let Err(RpcError::Fault(fault)) = &outcome {
        error!(target: "radius.rpc", call_id = %id, fault = %fault, "rpc_reply_fault");
    }
    if !pending.resolve(&id, outcome) {
        debug!(target: "radius.rpc", call_id = %id, "rpc_reply_uncorrelated");
    }
}

/// 通知观察者；回调 panic 时只记录日志。
pub fn notify_observer(observer: Option<&ChannelObserver>, event: &ChannelEvent) {
    let Some(observer) = observer else {
        return;
    };
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer(event))) {
        error!(
            target: "radius.rpc",
            fault = %panic_message(&*panic),
            "channel_observer_fault"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
