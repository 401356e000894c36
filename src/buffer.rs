//! The pending buffer: links waiting for the consuming application.
//!
//! Items are kept in insertion order under a single slot of a
//! [`KeyValueStore`], serialized as a JSON array of `{url, title}` objects.
//! A missing or unreadable slot reads as an empty buffer. All reads and
//! writes go through one async lock so a drain never observes half of an
//! append.

use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::error::IntakeError;
use crate::model::SharedItem;
use crate::store::KeyValueStore;

pub const DEFAULT_SLOT: &str = "pending_data";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppendStats {
    pub added: usize,
    pub duplicates: usize,
    pub blank: usize,
}

pub struct PendingBuffer<S> {
    store: S,
    slot: String,
    lock: Mutex<()>,
}

/// Decodes a stored slot, skipping anything that is not a usable item.
///
/// Bare string entries come from the older url-only layout and are upgraded
/// to untitled items.
pub fn decode_slot(raw: &str) -> Vec<SharedItem> {
    let entries: Vec<JsonValue> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "pending slot is unreadable, treating as empty");
            return vec![];
        }
    };

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let item = match entry {
            JsonValue::Object(obj) => {
                let Some(url) = obj.get("url").and_then(JsonValue::as_str) else {
                    continue;
                };
                let title = obj.get("title").and_then(JsonValue::as_str).unwrap_or_default();
                SharedItem::new(url, title)
            }
            JsonValue::String(url) => SharedItem::untitled(url),
            _ => continue,
        };

        if item.url.trim().is_empty() || !seen.insert(item.url.clone()) {
            continue;
        }
        items.push(item);
    }
    items
}

/// Merges `incoming` into `existing`, keeping the first item seen per url.
pub fn merge_items(existing: &mut Vec<SharedItem>, incoming: Vec<SharedItem>) -> AppendStats {
    let mut stats = AppendStats::default();
    let mut seen: HashSet<String> = existing.iter().map(|item| item.url.clone()).collect();

    for item in incoming {
        if item.url.trim().is_empty() {
            stats.blank += 1;
        } else if seen.insert(item.url.clone()) {
            existing.push(item);
            stats.added += 1;
        } else {
            stats.duplicates += 1;
        }
    }
    stats
}

impl<S: KeyValueStore> PendingBuffer<S> {
    pub fn new(store: S, slot: impl Into<String>) -> Self {
        PendingBuffer {
            store,
            slot: slot.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    async fn load(&self) -> Vec<SharedItem> {
        match self.store.get(&self.slot).await {
            Ok(Some(raw)) => decode_slot(&raw),
            Ok(None) => vec![],
            Err(e) => {
                tracing::warn!(error = %crate::unpack_error(&e), slot = %self.slot, "failed to read pending slot");
                vec![]
            }
        }
    }

    async fn save(&self, items: &[SharedItem]) -> Result<(), IntakeError> {
        let encoded = serde_json::to_string(items)?;
        self.store.set(&self.slot, &encoded).await?;
        Ok(())
    }

    /// Appends `items`, skipping urls that are blank or already buffered.
    pub async fn append(&self, items: Vec<SharedItem>) -> Result<AppendStats, IntakeError> {
        let _guard = self.lock.lock().await;

        let mut current = self.load().await;
        let stats = merge_items(&mut current, items);
        if stats.added > 0 {
            self.save(&current).await?;
        }

        tracing::info!(
            added = stats.added,
            duplicates = stats.duplicates,
            pending = current.len(),
            "appended shared items"
        );
        Ok(stats)
    }

    /// Returns the buffered items and leaves the buffer empty.
    ///
    /// The slot is cleared before anything is returned; when clearing fails
    /// the items stay buffered and the error is returned instead.
    pub async fn drain(&self) -> Result<Vec<SharedItem>, IntakeError> {
        let _guard = self.lock.lock().await;

        let current = self.load().await;
        self.save(&[]).await?;

        tracing::info!(count = current.len(), "drained pending buffer");
        Ok(current)
    }

    /// Drains the buffer into a JSON array, `"[]"` on any failure.
    pub async fn consume_json(&self) -> String {
        let items = match self.drain().await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %crate::unpack_error(&e), "failed to drain pending buffer");
                return "[]".to_string();
            }
        };

        serde_json::to_string(&items).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode drained items");
            "[]".to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Lock("read only".to_string()))
        }
    }

    fn items(pairs: &[(&str, &str)]) -> Vec<SharedItem> {
        pairs.iter().map(|(url, title)| SharedItem::new(*url, *title)).collect()
    }

    #[tokio::test]
    async fn test_append_deduplicates_by_url() {
        let buffer = PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT);

        let stats = buffer
            .append(items(&[("https://a.com/1", "first"), ("https://b.com/2", "")]))
            .await
            .unwrap();
        assert_eq!(stats.added, 2);

        let stats = buffer
            .append(items(&[("https://a.com/1", "second"), ("https://c.com/3", "c")]))
            .await
            .unwrap();
        assert_eq!(stats, AppendStats { added: 1, duplicates: 1, blank: 0 });

        assert_eq!(
            buffer.drain().await.unwrap(),
            items(&[("https://a.com/1", "first"), ("https://b.com/2", ""), ("https://c.com/3", "c")])
        );
    }

    #[tokio::test]
    async fn test_append_nothing_is_a_noop() {
        let buffer = PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT);
        buffer.append(items(&[("https://a.com/1", "a")])).await.unwrap();

        let stats = buffer.append(vec![]).await.unwrap();
        assert_eq!(stats, AppendStats::default());
        assert_eq!(buffer.drain().await.unwrap(), items(&[("https://a.com/1", "a")]));
    }

    #[tokio::test]
    async fn test_blank_urls_are_skipped() {
        let buffer = PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT);
        let stats = buffer.append(items(&[("  ", "x"), ("", "")])).await.unwrap();
        assert_eq!(stats.blank, 2);
        assert!(buffer.drain().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_is_consuming() {
        let buffer = PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT);
        buffer.append(items(&[("https://a.com/1", "")])).await.unwrap();

        assert_eq!(buffer.drain().await.unwrap().len(), 1);
        assert!(buffer.drain().await.unwrap().is_empty());
        assert_eq!(buffer.consume_json().await, "[]");
    }

    #[tokio::test]
    async fn test_consume_json_shape() {
        let buffer = PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT);
        buffer.append(items(&[("https://a.com/1", "A title")])).await.unwrap();

        assert_eq!(
            buffer.consume_json().await,
            r#"[{"url":"https://a.com/1","title":"A title"}]"#
        );
    }

    #[tokio::test]
    async fn test_unreadable_slot_reads_as_empty() {
        let store = MemoryStore::with_value(DEFAULT_SLOT, "{not json");
        let buffer = PendingBuffer::new(store, DEFAULT_SLOT);
        assert_eq!(buffer.consume_json().await, "[]");

        buffer.append(items(&[("https://a.com/1", "")])).await.unwrap();
        assert_eq!(buffer.drain().await.unwrap(), items(&[("https://a.com/1", "")]));
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_items() {
        let store = ReadOnlyStore(MemoryStore::with_value(
            DEFAULT_SLOT,
            r#"[{"url":"https://a.com/1","title":""}]"#,
        ));
        let buffer = PendingBuffer::new(store, DEFAULT_SLOT);

        assert_eq!(buffer.consume_json().await, "[]");
        assert!(buffer.drain().await.is_err());
        assert_eq!(
            buffer.store.0.get(DEFAULT_SLOT).await.unwrap(),
            Some(r#"[{"url":"https://a.com/1","title":""}]"#.to_string())
        );
    }

    #[test]
    fn test_decode_slot_is_tolerant() {
        let raw = r#"[
            {"url":"https://a.com/1","title":"A"},
            "https://legacy.com/1",
            {"title":"no url"},
            {"url":"https://b.com/2"},
            {"url":"https://a.com/1","title":"dupe"},
            {"url":"   "},
            42,
            null
        ]"#;
        assert_eq!(
            decode_slot(raw),
            items(&[("https://a.com/1", "A"), ("https://legacy.com/1", ""), ("https://b.com/2", "")])
        );
        assert!(decode_slot("").is_empty());
        assert!(decode_slot(r#"{"url":"https://a.com/1"}"#).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let buffer = std::sync::Arc::new(PendingBuffer::new(MemoryStore::new(), DEFAULT_SLOT));

        let mut handles = Vec::new();
        for i in 0..16 {
            let buffer = buffer.clone();
            handles.push(tokio::spawn(async move {
                let url = format!("https://a.com/{}", i);
                buffer.append(vec![SharedItem::untitled(url)]).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(buffer.drain().await.unwrap().len(), 16);
    }
}
