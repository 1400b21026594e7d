//! Knowledge-base item representations.
//!
//! Items are server-owned: the client never assigns an id. Reads accept both snake_case and
//! camelCase field names; writes use snake_case.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Item or user identifier. The server may send it as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Signed(i64),
            Unsigned(u64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => ItemId(s),
            Raw::Signed(n) => ItemId(n.to_string()),
            Raw::Unsigned(n) => ItemId(n.to_string()),
        })
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        ItemId(n.to_string())
    }
}

/// A knowledge-base record as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Lifecycle state (e.g. "active", "archived"); values are server-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ItemId>,
}

/// `GET /api/items/{id}`: the item plus its related items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub neighbors: Vec<Item>,
}

/// Fields for `POST /api/items`. At least one of `title` or `text` must be non-empty.
/// Whitespace counts as content; the server decides whether it is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl NewItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let filled = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.is_empty());
        if filled(&self.title) || filled(&self.text) {
            return Ok(());
        }
        Err(Error::validation_with_context(
            "title or text is required",
            ErrorContext::new()
                .with_field_path("item.title|item.text")
                .with_source("create_item"),
        ))
    }
}

/// Partial update for `PUT /api/items/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Confirmation returned by `DELETE /api/items/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_reads_numeric_ids_and_camel_case() {
        let item: Item = serde_json::from_value(json!({
            "id": 42,
            "title": "Rust book",
            "tags": null,
            "createdAt": "2024-05-01T10:00:00Z",
            "userId": "u-7"
        }))
        .unwrap();
        assert_eq!(item.id, Some(ItemId::from(42u64)));
        assert!(item.tags.is_empty());
        assert_eq!(item.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(item.user_id.as_ref().map(ItemId::as_str), Some("u-7"));
    }

    #[test]
    fn detail_flattens_item_and_neighbors() {
        let detail: ItemDetail = serde_json::from_value(json!({
            "id": "a1",
            "text": "body",
            "tags": ["x", "y"],
            "neighbors": [{"id": "b2", "title": "close"}]
        }))
        .unwrap();
        assert_eq!(detail.item.id, Some(ItemId::new("a1")));
        assert_eq!(detail.item.tags, vec!["x", "y"]);
        assert_eq!(detail.neighbors.len(), 1);
        assert_eq!(detail.neighbors[0].title.as_deref(), Some("close"));
    }

    #[test]
    fn new_item_requires_title_or_text() {
        assert!(NewItem::new().validate().unwrap_err().is_validation());
        assert!(NewItem::new().title("").url("https://x").validate().is_err());
        assert!(NewItem::new().title("").text("").validate().is_err());
        assert!(NewItem::new().title("  ").validate().is_ok());
        assert!(NewItem::new().title("T").validate().is_ok());
        assert!(NewItem::new().text("body").validate().is_ok());
    }

    #[test]
    fn patch_sends_only_set_fields() {
        let patch = ItemPatch::new().state("archived").tags(["old"]);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"tags": ["old"], "state": "archived"})
        );
        assert!(ItemPatch::new().is_empty());
        assert!(!patch.is_empty());
    }
}
