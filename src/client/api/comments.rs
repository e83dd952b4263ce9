/**
 * Favorite-Comments Service Client
 *
 * HTTP client for the comments service. Every route is scoped by the
 * identity token:
 *
 * - `GET    {base}/{identity}?flags=N` - list favorited comments
 * - `PUT    {base}/{identity}/{id}`    - store a favorited comment
 * - `DELETE {base}/{identity}/{id}`    - forget a favorited comment
 */

use super::{build_http_client, check_status, MembershipBackend, Query};
use crate::client::config::Config;
use crate::client::identity::Identity;
use crate::shared::{BackendError, CommentId, FavedComment};
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpMembershipBackend {
    config: Config,
    client: Client,
}

impl HttpMembershipBackend {
    pub fn new(config: Config) -> Result<Self, BackendError> {
        let client = build_http_client(config.request_timeout())?;
        Ok(Self { config, client })
    }

    fn comment_url(&self, identity: &Identity, id: CommentId) -> String {
        self.config
            .comments_url(&format!("{}/{}", identity.as_str(), id))
    }
}

#[async_trait]
impl MembershipBackend for HttpMembershipBackend {
    async fn fetch_all(
        &self,
        identity: &Identity,
        content_mask: u32,
    ) -> Result<Vec<FavedComment>, BackendError> {
        let url = self.config.comments_url(identity.as_str());
        let query = Query::new().put("flags", content_mask);

        let response = self.client.get(&url).query(query.pairs()).send().await?;
        let response = check_status(response).await?;

        let body = response.bytes().await?;
        let comments: Vec<FavedComment> = serde_json::from_slice(&body)?;
        Ok(comments)
    }

    async fn confirm_add(
        &self,
        identity: &Identity,
        comment: &FavedComment,
    ) -> Result<(), BackendError> {
        let url = self.comment_url(identity, comment.id);
        let response = self.client.put(&url).json(comment).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn confirm_remove(&self, identity: &Identity, id: CommentId) -> Result<(), BackendError> {
        let url = self.comment_url(identity, id);
        let response = self.client.delete(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
