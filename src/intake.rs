//! Turns share events into buffered items.

use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use crate::buffer::{AppendStats, PendingBuffer};
use crate::callback::{CallbackMatcher, ViewRoute};
use crate::error::IntakeError;
use crate::extract::extract_urls;
use crate::model::{Attachment, AttachmentKind, ShareEvent, SharedItem};
use crate::store::KeyValueStore;
use crate::title::{TitleRules, strip_url};

/// Outcome of one share event, returned once its items are appended.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReport {
    pub collected: usize,
    pub added: usize,
    pub duplicates: usize,
    /// Set only for view events that belong to the auth flow.
    pub auth_route: Option<String>,
}

impl IntakeReport {
    fn from_stats(collected: usize, stats: AppendStats) -> Self {
        IntakeReport {
            collected,
            added: stats.added,
            duplicates: stats.duplicates,
            auth_route: None,
        }
    }
}

pub struct ShareIntake<S> {
    buffer: PendingBuffer<S>,
    titles: TitleRules,
    callbacks: CallbackMatcher,
    attachment_timeout: Option<Duration>,
}

/// Items for a single text share: every extracted url with an inferred
/// title, plus the attached stream uri taken verbatim.
pub fn collect_single_text(rules: &TitleRules, text: &str, subject: &str, stream_uri: Option<&str>) -> Vec<SharedItem> {
    tracing::debug!(subject = subject, text = text, "single text share received");

    let mut items: Vec<SharedItem> = extract_urls(text)
        .into_iter()
        .map(|url| {
            let title = rules.infer(text, &url, subject);
            tracing::debug!(url = %url, title = %title, "title candidate");
            SharedItem::new(url, title)
        })
        .collect();

    if let Some(uri) = stream_uri {
        items.push(SharedItem::untitled(uri));
    }
    items
}

/// Items for a multi-text share. Titles are the text minus the url, without
/// the full inference chain.
pub fn collect_multiple_texts(texts: &[String]) -> Vec<SharedItem> {
    texts
        .iter()
        .flat_map(|text| {
            extract_urls(text)
                .into_iter()
                .map(move |url| {
                    let title = strip_url(text, &url);
                    SharedItem::new(url, title)
                })
        })
        .collect()
}

/// Urls from loaded attachments, trimmed and de-duplicated in first-seen order.
pub fn collect_attachment_urls(attachments: &[Attachment]) -> Vec<String> {
    let candidates = attachments.iter().flat_map(|attachment| match attachment.kind {
        AttachmentKind::Url => vec![attachment.payload.clone()],
        AttachmentKind::Text => extract_urls(&attachment.payload),
    });

    let mut seen = HashSet::new();
    candidates
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty() && seen.insert(url.clone()))
        .collect()
}

impl<S: KeyValueStore> ShareIntake<S> {
    pub fn new(buffer: PendingBuffer<S>) -> Self {
        ShareIntake {
            buffer,
            titles: TitleRules::default(),
            callbacks: CallbackMatcher::default(),
            attachment_timeout: None,
        }
    }

    pub fn with_titles(mut self, titles: TitleRules) -> Self {
        self.titles = titles;
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackMatcher) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_attachment_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attachment_timeout = timeout;
        self
    }

    pub fn buffer(&self) -> &PendingBuffer<S> {
        &self.buffer
    }

    async fn append(&self, items: Vec<SharedItem>) -> Result<IntakeReport, IntakeError> {
        let collected = items.len();
        if collected == 0 {
            return Ok(IntakeReport::default());
        }
        let stats = self.buffer.append(items).await?;
        Ok(IntakeReport::from_stats(collected, stats))
    }

    pub async fn handle(&self, event: ShareEvent) -> Result<IntakeReport, IntakeError> {
        tracing::info!(kind = event.kind(), "share event received");

        match event {
            ShareEvent::SingleText {
                text,
                subject,
                stream_uri,
            } => {
                let items = collect_single_text(&self.titles, &text, &subject, stream_uri.as_deref());
                self.append(items).await
            }
            ShareEvent::MultipleTexts { texts } => self.append(collect_multiple_texts(&texts)).await,
            ShareEvent::DirectView { url } => self.handle_view(url).await,
            ShareEvent::AttachmentList { attachments } => {
                let loads = attachments
                    .into_iter()
                    .map(|attachment| std::future::ready(Ok::<_, anyhow::Error>(attachment)));
                self.ingest_attachments(loads).await
            }
        }
    }

    async fn handle_view(&self, url: String) -> Result<IntakeReport, IntakeError> {
        match self.callbacks.route(&url) {
            ViewRoute::Capture => self.append(vec![SharedItem::untitled(url)]).await,
            ViewRoute::AuthCallback => {
                tracing::info!("auth callback passed through to routing");
                Ok(IntakeReport {
                    auth_route: Some(url),
                    ..IntakeReport::default()
                })
            }
            ViewRoute::Discard => {
                tracing::info!("callback-like view url discarded");
                Ok(IntakeReport::default())
            }
        }
    }

    /// Loads every attachment concurrently and appends the batch once all
    /// loads have finished. Failed or timed out loads are skipped.
    pub async fn ingest_attachments<I, F>(&self, loads: I) -> Result<IntakeReport, IntakeError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = anyhow::Result<Attachment>>,
    {
        let timeout = self.attachment_timeout;
        let pending = loads.into_iter().enumerate().map(|(index, load)| async move {
            let loaded = match timeout {
                Some(limit) => match tokio::time::timeout(limit, load).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow::anyhow!("timed out after {:?}", limit)),
                },
                None => load.await,
            };
            match loaded {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    tracing::warn!(index = index, error = %e, "failed to load attachment");
                    None
                }
            }
        });

        let attachments: Vec<Attachment> = join_all(pending).await.into_iter().flatten().collect();
        let urls = collect_attachment_urls(&attachments);
        tracing::debug!(attachments = attachments.len(), urls = urls.len(), "attachments loaded");

        self.append(urls.into_iter().map(SharedItem::untitled).collect()).await
    }
}
