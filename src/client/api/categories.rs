/**
 * Tag-Service Client
 *
 * The tag service serves the feeds the official API has no endpoint for
 * (random, best-of, controversial, text) and a general search that
 * understands the advanced query language.
 */

use super::{build_http_client, check_status, GeneralParams, Query, TagServiceFeedBackend};
use crate::client::config::Config;
use crate::shared::{BackendError, FeedPage};
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpTagServiceBackend {
    config: Config,
    client: Client,
}

impl HttpTagServiceBackend {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self { config, client })
    }

    async fn get_page(&self, path: &str, query: Query) -> Result<FeedPage, BackendError> {
        let url = self.config.tag_service_url(path);
        let response = self.client.get(&url).query(query.pairs()).send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TagServiceFeedBackend for HttpTagServiceBackend {
    async fn random(&self, tags: Option<&str>, flags: u32) -> Result<FeedPage, BackendError> {
        let query = Query::new().opt("tags", tags).put("flags", flags);
        self.get_page("random", query).await
    }

    async fn best_of(
        &self,
        tags: Option<&str>,
        user: Option<&str>,
        flags: u32,
        older: Option<u64>,
        score: u32,
    ) -> Result<FeedPage, BackendError> {
        let query = Query::new()
            .opt("tags", tags)
            .opt("user", user)
            .put("flags", flags)
            .opt("older", older)
            .put("score", score);
        self.get_page("bestof", query).await
    }

    async fn controversial(
        &self,
        tags: Option<&str>,
        flags: u32,
        older: Option<u64>,
    ) -> Result<FeedPage, BackendError> {
        let query = Query::new().opt("tags", tags).put("flags", flags).opt("older", older);
        self.get_page("controversial", query).await
    }

    async fn text(
        &self,
        tags: Option<&str>,
        flags: u32,
        older: Option<u64>,
    ) -> Result<FeedPage, BackendError> {
        let query = Query::new().opt("tags", tags).put("flags", flags).opt("older", older);
        self.get_page("text", query).await
    }

    async fn general(&self, params: &GeneralParams) -> Result<FeedPage, BackendError> {
        let query = Query::new()
            .flag("promoted", params.promoted)
            .opt("tags", params.tags.as_deref())
            .opt("user", params.user.as_deref())
            .put("flags", params.flags)
            .opt("older", params.older)
            .opt("newer", params.newer)
            .opt("id", params.around);
        self.get_page("general", query).await
    }
}
