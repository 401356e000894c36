//! Title inference for shared links.
//!
//! Apps share links in wildly different shapes: some put the page title in
//! the subject, some send `"title\nurl"`, others only send their own name
//! ("Instagram", "네이버 카페"). [`TitleRules`] holds the two open-ended lists
//! the heuristics depend on, generic app labels and boilerplate suffixes,
//! so they can be extended from configuration.

use serde::Deserialize;

const DEFAULT_GENERIC_TITLES: &[&str] = &[
    "네이버 카페",
    "naver cafe",
    "네이버카페",
    "네이버 블로그",
    "naver blog",
    "카카오톡",
    "kakaotalk",
    "인스타그램",
    "instagram",
    "페이스북",
    "facebook",
    "트위터",
    "twitter",
    "x",
    "유튜브",
    "youtube",
];

const DEFAULT_TITLE_SUFFIXES: &[&str] = &[
    " - 네이버 카페",
    " : 네이버 카페",
    " | 네이버 카페",
    " - 네이버 블로그",
    " : 네이버 블로그",
    " | 네이버 블로그",
    " - YouTube",
    " | YouTube",
    " on Instagram",
    " on Twitter",
    " on X",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TitleRules {
    #[serde(default = "default_generic")]
    pub generic: Vec<String>,
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
}

fn default_generic() -> Vec<String> {
    DEFAULT_GENERIC_TITLES.iter().map(|s| s.to_string()).collect()
}

fn default_suffixes() -> Vec<String> {
    DEFAULT_TITLE_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for TitleRules {
    fn default() -> Self {
        TitleRules {
            generic: default_generic(),
            suffixes: default_suffixes(),
        }
    }
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    if s.len() < suffix.len() {
        return false;
    }
    let start = s.len() - suffix.len();
    s.is_char_boundary(start) && s[start..].to_lowercase() == suffix.to_lowercase()
}

impl TitleRules {
    /// A label is generic when it is, starts with or ends with an app name
    /// and therefore says nothing about the shared page.
    pub fn is_generic(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        let lower = lower.trim();
        self.generic.iter().any(|label| {
            let label = label.to_lowercase();
            lower == label
                || lower.starts_with(&format!("{} ", label))
                || lower.ends_with(&format!(" {}", label))
        })
    }

    /// Trims `title` and strips the first matching boilerplate suffix.
    pub fn clean(&self, title: &str) -> String {
        let trimmed = title.trim();
        for suffix in &self.suffixes {
            if ends_with_ignore_case(trimmed, suffix) {
                return trimmed[..trimmed.len() - suffix.len()].trim().to_string();
            }
        }
        trimmed.to_string()
    }

    /// Picks the best title for `url` from a text share and its subject line.
    pub fn infer(&self, text: &str, url: &str, subject: &str) -> String {
        if !subject.trim().is_empty() && !self.is_generic(subject) {
            return self.clean(subject);
        }

        let remainder = strip_url(text, url);

        let first_line = remainder
            .split('\n')
            .map(str::trim)
            .find(|line| !line.is_empty() && !self.is_generic(line) && !line.starts_with("http"));
        if let Some(line) = first_line {
            return self.clean(line);
        }

        let collapsed = remainder.replace('\n', " ");
        let collapsed = collapsed.trim();
        if !collapsed.is_empty() && !self.is_generic(collapsed) {
            return self.clean(collapsed);
        }

        if !subject.trim().is_empty() {
            return self.clean(subject);
        }

        String::new()
    }
}

/// Removes every occurrence of `url` from `text` and trims the rest.
pub fn strip_url(text: &str, url: &str) -> String {
    if url.is_empty() {
        return text.trim().to_string();
    }
    text.replace(url, "").trim().to_string()
}
