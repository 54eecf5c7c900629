use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::result::ErrorInfo;

/// Opaque continuation token issued by a service.
///
/// Only the issuing service builds (`new`) or reads (`decode`) a key. Hosts
/// carry it back unmodified, optionally through its string token form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(serde_json::Value);

impl PageKey {
    pub fn new<T: Serialize>(state: &T) -> Result<Self, ErrorInfo> {
        Ok(Self(serde_json::to_value(state)?))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ErrorInfo> {
        serde_json::from_value(self.0.clone())
            .map_err(|e| ErrorInfo::invalid_request(format!("unrecognized page key: {}", e)))
    }

    /// Render as a string that can be handed back through `from_token`.
    pub fn to_token(&self) -> String {
        self.0.to_string()
    }

    pub fn from_token(token: &str) -> Result<Self, ErrorInfo> {
        serde_json::from_str(token)
            .map(Self)
            .map_err(|e| ErrorInfo::invalid_request(format!("malformed page token: {}", e)))
    }
}

/// One page of a list fetch plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_key: Option<PageKey>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_key: Option<PageKey>) -> Self {
        Self { items, next_key }
    }

    /// A page with no further pages after it.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_key: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_key.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Cursor {
        page: u32,
        after: String,
    }

    #[test]
    fn test_issuer_can_decode_own_key() {
        let key = PageKey::new(&Cursor {
            page: 2,
            after: "abc".to_string(),
        })
        .unwrap();

        let cursor: Cursor = key.decode().unwrap();
        assert_eq!(cursor.page, 2);
        assert_eq!(cursor.after, "abc");
    }

    #[test]
    fn test_token_passes_through_unchanged() {
        let key = PageKey::new(&Cursor {
            page: 9,
            after: "zz".to_string(),
        })
        .unwrap();

        let back = PageKey::from_token(&key.to_token()).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_foreign_key_is_invalid_request() {
        let key = PageKey::new(&"just-a-string").unwrap();
        let err = key.decode::<Cursor>().unwrap_err();
        assert_eq!(err.kind, super::super::result::ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_malformed_token() {
        assert!(PageKey::from_token("{not json").is_err());
    }

    #[test]
    fn test_last_page_has_no_more() {
        let page = Page::last(vec![1, 2]);
        assert!(!page.has_more());
        assert_eq!(page.len(), 2);

        let page = Page::new(vec![1], Some(PageKey::new(&2).unwrap()));
        assert!(page.has_more());
        assert_eq!(page.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
