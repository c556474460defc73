//! HTTP implementation of [`PlannerApi`] on top of `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::PlannerApi;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{Collection, CollectionDraft, CollectionPatch, Item, ItemPatch, NewItem};

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct ReorderArgs<'a> {
    #[serde(rename = "itemIds")]
    item_ids: &'a [String],
}

pub struct RestApi {
    client: Client,
    endpoint: String,
}

impl RestApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send(request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let body = Self::send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait(?Send)]
impl PlannerApi for RestApi {
    async fn list_collections(&self) -> ApiResult<Vec<Collection>> {
        Self::send_json(self.client.get(self.url("/collections"))).await
    }

    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<Collection> {
        Self::send_json(self.client.post(self.url("/collections")).json(draft)).await
    }

    async fn update_collection(&self, id: &str, patch: &CollectionPatch) -> ApiResult<Collection> {
        let url = self.url(&format!("/collections/{}", id));
        Self::send_json(self.client.patch(url).json(patch)).await
    }

    async fn delete_collection(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/collections/{}", id));
        Self::send(self.client.delete(url)).await.map(|_| ())
    }

    async fn list_items(&self, collection_id: &str) -> ApiResult<Vec<Item>> {
        let url = self.url(&format!("/collections/{}/items", collection_id));
        Self::send_json(self.client.get(url)).await
    }

    async fn create_item(&self, item: &NewItem<'_>) -> ApiResult<Item> {
        Self::send_json(self.client.post(self.url("/items")).json(item)).await
    }

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> ApiResult<Item> {
        let url = self.url(&format!("/items/{}", id));
        Self::send_json(self.client.patch(url).json(patch)).await
    }

    async fn delete_item(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/items/{}", id));
        Self::send(self.client.delete(url)).await.map(|_| ())
    }

    async fn reorder_items(&self, collection_id: &str, item_ids: &[String]) -> ApiResult<()> {
        let url = self.url(&format!("/collections/{}/reorder", collection_id));
        Self::send(self.client.post(url).json(&ReorderArgs { item_ids })).await.map(|_| ())
    }
}
