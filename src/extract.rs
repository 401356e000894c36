use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::normalize::normalize_token;

/// Liberal web-URL matcher: optional `http(s)://` scheme, a dotted host (or an
/// IPv4 address), optional port and an optional path/query/fragment tail.
/// Hits are only candidates; [`normalize_token`] decides what survives.
static WEB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:https?://(?:[^\s/?#<>"@]+@)?)?(?:(?:\d{1,3}\.){3}\d{1,3}|(?:[\p{L}\p{N}](?:[\p{L}\p{N}\-]*[\p{L}\p{N}])?\.)+\p{L}{2,})(?::\d{1,5})?(?:[/?#][^\s<>"]*)?"#,
    )
    .expect("valid web url pattern")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Extracts every URL in `text`, in first-seen order and without duplicates.
///
/// Web-URL matches come first; a second pass over whitespace-separated
/// tokens then adds scheme-less social links the matcher does not report.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    let matched = WEB_URL.find_iter(text).map(|m| m.as_str());
    let tokens = WHITESPACE.split(text);

    for candidate in matched.chain(tokens) {
        if let Some(url) = normalize_token(candidate) {
            if seen.insert(url.clone()) {
                found.push(url);
            }
        }
    }

    tracing::debug!(count = found.len(), "extracted urls");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_scheme_urls() {
        let urls = extract_urls("Check this out\nhttps://a.com/1");
        assert_eq!(urls, vec!["https://a.com/1"]);
    }

    #[test]
    fn test_deduplicates_in_first_seen_order() {
        let urls = extract_urls("https://b.com/2 then https://a.com/1 and https://b.com/2 again");
        assert_eq!(urls, vec!["https://b.com/2", "https://a.com/1"]);
    }

    #[test]
    fn test_trailing_punctuation_is_dropped() {
        let urls = extract_urls("Read this: https://example.com/post. (see https://c.com/x)");
        assert_eq!(urls, vec!["https://example.com/post", "https://c.com/x"]);
    }

    #[test]
    fn test_schemeless_social_links() {
        let urls = extract_urls("look at x.com/user/status/1 and www.threads.net/@a/post/2");
        assert_eq!(
            urls,
            vec![
                "https://x.com/user/status/1",
                "https://www.threads.net/@a/post/2"
            ]
        );
    }

    #[test]
    fn test_plain_bare_domains_are_ignored() {
        assert!(extract_urls("visit example.com or naver.com today").is_empty());
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("no links here, e.g. nothing").is_empty());
    }

    #[test]
    fn test_whitespace_pass_catches_unmatched_hosts() {
        let urls = extract_urls("dev server http://localhost:3000/app is up");
        assert_eq!(urls, vec!["http://localhost:3000/app"]);
    }

    #[test]
    fn test_korean_share_text() {
        let text = "[네이버 카페] 오늘의 글\nhttps://cafe.naver.com/abc/123\n\n카카오톡에서 공유";
        assert_eq!(extract_urls(text), vec!["https://cafe.naver.com/abc/123"]);
    }

    #[test]
    fn test_ip_host() {
        let urls = extract_urls("router at http://192.168.0.1:8080/admin");
        assert_eq!(urls, vec!["http://192.168.0.1:8080/admin"]);
    }
}
