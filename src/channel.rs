//! Method-call dispatch for the consuming application.

use crate::buffer::PendingBuffer;
use crate::store::KeyValueStore;

pub const CHANNEL_NAME: &str = "url_inbox/share";
pub const CONSUME_SHARED_URLS: &str = "consumeSharedUrls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResult {
    Success(String),
    NotImplemented(String),
}

pub async fn dispatch<S: KeyValueStore>(buffer: &PendingBuffer<S>, method: &str) -> MethodResult {
    match method {
        CONSUME_SHARED_URLS => MethodResult::Success(buffer.consume_json().await),
        other => {
            tracing::warn!(channel = CHANNEL_NAME, method = other, "unsupported method call");
            MethodResult::NotImplemented(other.to_string())
        }
    }
}
