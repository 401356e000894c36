//! Cleanup of raw text tokens into candidate URLs.
//!
//! Share payloads wrap links in brackets and quotes, end them with sentence
//! punctuation and sometimes smuggle zero-width characters into them. Social
//! apps also share scheme-less links (`x.com/...`) that a generic web-URL
//! matcher does not report. [`normalize_token`] handles both cases while
//! refusing arbitrary bare domains so ordinary words never become links.

const LEADING_JUNK: &[char] = &['(', '[', '{', '<', '"', '\''];
const TRAILING_JUNK: &[char] = &[')', ']', '}', '>', '"', '\'', ',', '.', '!', '?', ';', ':'];
const INVISIBLE: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

const SCHEMES: &[&str] = &["http://", "https://"];

/// Bare-domain prefixes that are accepted without a scheme.
pub const SCHEMELESS_PREFIXES: &[&str] = &[
    "x.com/",
    "twitter.com/",
    "t.co/",
    "www.x.com/",
    "www.twitter.com/",
    "threads.net/",
    "www.threads.net/",
    "threads.com/",
    "www.threads.com/",
];

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Cleans `raw` into a URL, or returns `None` when the token is not one.
///
/// Tokens that already carry an `http`/`https` scheme are returned as they
/// are after cleanup (scheme case included). Allow-listed social domains get
/// `https://` prepended.
pub fn normalize_token(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(LEADING_JUNK)
        .trim_end_matches(TRAILING_JUNK)
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .collect();

    if cleaned.trim().is_empty() {
        return None;
    }

    if SCHEMES.iter().any(|s| starts_with_ignore_case(&cleaned, s)) {
        return Some(cleaned);
    }

    if SCHEMELESS_PREFIXES
        .iter()
        .any(|p| starts_with_ignore_case(&cleaned, p))
    {
        return Some(format!("https://{}", cleaned));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_tokens_keep_their_case() {
        assert_eq!(
            normalize_token("HTTPS://Example.com/x."),
            Some("HTTPS://Example.com/x".to_string())
        );
        assert_eq!(
            normalize_token("http://a.com/path"),
            Some("http://a.com/path".to_string())
        );
    }

    #[test]
    fn test_schemeless_social_domains() {
        assert_eq!(
            normalize_token("x.com/abc123"),
            Some("https://x.com/abc123".to_string())
        );
        assert_eq!(
            normalize_token("WWW.Threads.net/@user/post/1"),
            Some("https://WWW.Threads.net/@user/post/1".to_string())
        );
        assert_eq!(
            normalize_token("t.co/xyz"),
            Some("https://t.co/xyz".to_string())
        );
    }

    #[test]
    fn test_rejects_other_tokens() {
        assert_eq!(normalize_token("notadomain/abc"), None);
        assert_eq!(normalize_token("example.com/abc"), None);
        assert_eq!(normalize_token("x.com"), None);
        assert_eq!(normalize_token("hello"), None);
    }

    #[test]
    fn test_blank_after_cleanup() {
        assert_eq!(normalize_token(""), None);
        assert_eq!(normalize_token("   "), None);
        assert_eq!(normalize_token("(\"...\")"), None);
        assert_eq!(normalize_token("\u{200B}"), None);
    }

    #[test]
    fn test_strips_wrapping_punctuation() {
        assert_eq!(
            normalize_token("(https://a.com/1)."),
            Some("https://a.com/1".to_string())
        );
        assert_eq!(
            normalize_token("<\"https://a.com/q?x=1\">,"),
            Some("https://a.com/q?x=1".to_string())
        );
        assert_eq!(
            normalize_token("'x.com/status/9'!?"),
            Some("https://x.com/status/9".to_string())
        );
    }

    #[test]
    fn test_strips_invisible_characters() {
        assert_eq!(
            normalize_token("https://a.com/\u{200B}path\u{FEFF}"),
            Some("https://a.com/path".to_string())
        );
        assert_eq!(
            normalize_token("\u{200D}x.com/abc"),
            Some("https://x.com/abc".to_string())
        );
    }
}
