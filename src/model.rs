use serde::{Deserialize, Serialize};

/// A buffered link. Two items with the same `url` are the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedItem {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl SharedItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        SharedItem {
            url: url.into(),
            title: title.into(),
        }
    }

    pub fn untitled(url: impl Into<String>) -> Self {
        SharedItem::new(url, "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Url,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub payload: String,
}

impl Attachment {
    pub fn url(payload: impl Into<String>) -> Self {
        Attachment {
            kind: AttachmentKind::Url,
            payload: payload.into(),
        }
    }

    pub fn text(payload: impl Into<String>) -> Self {
        Attachment {
            kind: AttachmentKind::Text,
            payload: payload.into(),
        }
    }
}

/// A share delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareEvent {
    SingleText {
        text: String,
        #[serde(default)]
        subject: String,
        #[serde(default)]
        stream_uri: Option<String>,
    },
    MultipleTexts {
        texts: Vec<String>,
    },
    DirectView {
        url: String,
    },
    AttachmentList {
        attachments: Vec<Attachment>,
    },
}

impl ShareEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ShareEvent::SingleText { .. } => "single_text",
            ShareEvent::MultipleTexts { .. } => "multiple_texts",
            ShareEvent::DirectView { .. } => "direct_view",
            ShareEvent::AttachmentList { .. } => "attachment_list",
        }
    }
}
