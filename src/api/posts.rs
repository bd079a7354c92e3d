use crate::api::types::{EngagementDetail, Post, PublishRequest, PublishResult};
use crate::api::{ApiClient, ApiClientError, encode_component};

impl ApiClient {
    pub async fn get_posts(&self) -> Result<Vec<Post>, ApiClientError> {
        self.get("/api/posts").await
    }

    /// Engagement records for one post.
    pub async fn get_post_engagements(
        &self,
        post_id: &str,
    ) -> Result<EngagementDetail, ApiClientError> {
        self.get(&format!(
            "/api/posts/{}/engagements",
            encode_component(post_id)
        ))
        .await
    }

    pub async fn publish_post(&self, text: &str) -> Result<PublishResult, ApiClientError> {
        self.post("/api/posts/publish", Some(&PublishRequest { text }))
            .await
    }
}
