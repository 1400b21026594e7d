//! Knowledge-base item CRUD. Each call is one request; nothing is cached.

use crate::transport::ApiPath;
use crate::types::{DeleteResponse, Item, ItemDetail, ItemPatch, NewItem};
use crate::{Error, ErrorContext, Result};
use reqwest::Method;
use serde::Deserialize;

use super::core::RagClient;

pub(crate) const ITEMS_PATH: &str = "/api/items";

/// `GET /api/items` answers with either a bare array or an `{"items": [...]}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemList {
    Bare(Vec<Item>),
    Wrapped { items: Vec<Item> },
}

fn item_path(id: &str, source: &str) -> Result<ApiPath> {
    if id.trim().is_empty() {
        return Err(Error::validation_with_context(
            "item id is required",
            ErrorContext::new().with_field_path("id").with_source(source),
        ));
    }
    Ok(ApiPath::new(ITEMS_PATH).segment(id))
}

impl RagClient {
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let response = self
            .transport
            .execute(Method::GET, &ApiPath::new(ITEMS_PATH), None, None)
            .await?;
        Ok(match serde_json::from_value(response)? {
            ItemList::Bare(items) | ItemList::Wrapped { items } => items,
        })
    }

    /// Fetch one item together with its `neighbors` (related items).
    pub async fn get_item(&self, id: &str) -> Result<ItemDetail> {
        let path = item_path(id, "get_item")?;
        let response = self.transport.execute(Method::GET, &path, None, None).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Create an item. Fails without a request when neither title nor text is set.
    pub async fn create_item(&self, item: &NewItem) -> Result<Item> {
        item.validate()?;
        let body = serde_json::to_value(item)?;
        let response = self
            .transport
            .execute(Method::POST, &ApiPath::new(ITEMS_PATH), None, Some(&body))
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Item> {
        let path = item_path(id, "update_item")?;
        let body = serde_json::to_value(patch)?;
        let response = self
            .transport
            .execute(Method::PUT, &path, None, Some(&body))
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn delete_item(&self, id: &str) -> Result<DeleteResponse> {
        let path = item_path(id, "delete_item")?;
        let response = self
            .transport
            .execute(Method::DELETE, &path, None, None)
            .await?;
        Ok(serde_json::from_value(response)?)
    }
}
