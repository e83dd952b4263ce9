/**
 * Canonical Items API Client
 *
 * `GET {api}/items/get` serves every feed the official site knows about.
 * Flags that are not set are left out of the query string entirely, the API
 * treats `promoted=0` differently from no `promoted` parameter.
 */

use super::{build_http_client, check_status, CanonicalFeedBackend, ItemsParams, Query};
use crate::client::config::Config;
use crate::shared::{BackendError, FeedPage, Post};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub struct HttpCanonicalFeedBackend {
    config: Config,
    client: Client,
}

impl HttpCanonicalFeedBackend {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self { config, client })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
    ) -> Result<T, BackendError> {
        let url = self.config.api_url(path);
        let response = self.client.get(&url).query(query.pairs()).send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

pub(crate) fn items_query(params: &ItemsParams) -> Query {
    Query::new()
        .flag("promoted", params.promoted)
        .flag("following", params.following)
        .opt("older", params.older)
        .opt("newer", params.newer)
        .opt("id", params.around)
        .put("flags", params.flags)
        .opt("tags", params.tags.as_deref())
        .opt("likes", params.likes.as_deref())
        .flag("self", params.self_only)
        .opt("user", params.user.as_deref())
}

#[async_trait]
impl CanonicalFeedBackend for HttpCanonicalFeedBackend {
    async fn items(&self, params: &ItemsParams) -> Result<FeedPage, BackendError> {
        self.get_json("items/get", items_query(params)).await
    }

    async fn item_info(&self, id: u64) -> Result<Post, BackendError> {
        self.get_json("items/info", Query::new().put("itemId", id))
            .await
    }
}
