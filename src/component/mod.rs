//! Page identity and component analysis model

pub mod model;
#[cfg(test)]
pub mod testutil;

pub use model::{ClusterId, Component};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one page: language code plus numeric page id.
/// Serialized as `"lang:id"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PageKey {
    pub lang: String,
    pub id: u32,
}

impl PageKey {
    pub fn new(lang: impl Into<String>, id: u32) -> Self {
        Self {
            lang: lang.into(),
            id,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let (lang, id) = text.split_once(':')?;
        if lang.is_empty() {
            return None;
        }
        Some(Self {
            lang: lang.to_string(),
            id: id.parse().ok()?,
        })
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lang, self.id)
    }
}

impl From<PageKey> for String {
    fn from(key: PageKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for PageKey {
    type Error = String;

    fn try_from(text: String) -> Result<Self, String> {
        PageKey::parse(&text).ok_or_else(|| format!("malformed page key: {text}"))
    }
}

/// One page as stored by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub key: PageKey,
    pub namespace: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Redirect target, if this page is a redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<PageKey>,
}

impl PageRecord {
    pub fn lang(&self) -> &str {
        &self.key.lang
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_key_round_trips_through_text() {
        let key = PageKey::new("en", 42);
        assert_eq!(key.to_string(), "en:42");
        assert_eq!(PageKey::parse("en:42"), Some(key));
        assert_eq!(PageKey::parse("no-colon"), None);
        assert_eq!(PageKey::parse(":17"), None);
        assert_eq!(PageKey::parse("en:notanumber"), None);
    }

    #[test]
    fn page_key_serializes_as_string() {
        let key = PageKey::new("de", 7);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"de:7\"");
        let back: PageKey = serde_json::from_str("\"de:7\"").unwrap();
        assert_eq!(back, key);
    }
}
