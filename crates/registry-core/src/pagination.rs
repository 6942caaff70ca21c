// ABOUTME: Opaque cursor pagination for the Anthropic-compatible discovery API
// ABOUTME: Encodes a stable sort position so callers never construct offsets by hand

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Opaque pagination cursor. Encodes the last-seen sort key (entity name) so
/// pages remain stable across inserts under server-side stable ordering by
/// name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    #[must_use]
    pub fn new(last_name: &str) -> Self {
        Self(URL_SAFE_NO_PAD.encode(last_name.as_bytes()))
    }

    #[must_use]
    pub fn decode(&self) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        String::from_utf8(bytes).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub const fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page of items plus the cursor to fetch the next one, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> CursorPage<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_names() {
        for name in ["", "/a", "/foo/bar-baz", "server with spaces"] {
            let cursor = Cursor::new(name);
            assert_eq!(cursor.decode().as_deref(), Some(name));
        }
    }

    #[test]
    fn rejects_garbage_cursor() {
        let cursor = Cursor::from_string("not valid base64!!".to_string());
        assert_eq!(cursor.decode(), None);
    }
}
