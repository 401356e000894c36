//! Recognition of the app's own sign-in callback links.
//!
//! The auth flow returns to the app through `<scheme>://login-callback?...`.
//! Those links must never land in the pending buffer, and only they may reach
//! the host's deep-link routing; every other view link is captured and kept
//! away from routing.

use url::Url;

pub const DEFAULT_CALLBACK_SCHEME: &str = "urlinbox";
pub const DEFAULT_CALLBACK_MARKER: &str = "login-callback";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRoute {
    /// Buffer the link, withhold it from routing.
    Capture,
    /// Strict callback match: forward to auth routing, do not buffer.
    AuthCallback,
    /// Loose callback match: neither buffered nor routed.
    Discard,
}

#[derive(Debug, Clone)]
pub struct CallbackMatcher {
    scheme: String,
    marker: String,
}

impl Default for CallbackMatcher {
    fn default() -> Self {
        CallbackMatcher::new(DEFAULT_CALLBACK_SCHEME, DEFAULT_CALLBACK_MARKER)
    }
}

impl CallbackMatcher {
    pub fn new(scheme: impl Into<String>, marker: impl Into<String>) -> Self {
        CallbackMatcher {
            scheme: scheme.into(),
            marker: marker.into(),
        }
    }

    /// Parsed scheme and host both match. Unparseable input never matches.
    pub fn is_strict_callback(&self, raw: &str) -> bool {
        match Url::parse(raw) {
            Ok(url) => {
                url.scheme().eq_ignore_ascii_case(&self.scheme)
                    && url
                        .host_str()
                        .is_some_and(|host| host.eq_ignore_ascii_case(&self.marker))
            }
            Err(e) => {
                tracing::debug!(error = %e, url = raw, "view url did not parse");
                false
            }
        }
    }

    /// True when `raw` mentions the callback marker anywhere or is a strict
    /// callback.
    pub fn is_callback(&self, raw: &str) -> bool {
        raw.to_lowercase().contains(&self.marker.to_lowercase()) || self.is_strict_callback(raw)
    }

    pub fn route(&self, raw: &str) -> ViewRoute {
        if self.is_strict_callback(raw) {
            ViewRoute::AuthCallback
        } else if self.is_callback(raw) {
            ViewRoute::Discard
        } else {
            ViewRoute::Capture
        }
    }
}
