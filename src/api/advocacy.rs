use crate::api::types::{AdvocacyStats, AdvocacySuggestion, ShareReceipt, ShareRequest};
use crate::api::{ApiClient, ApiClientError};

impl ApiClient {
    pub async fn get_advocacy_suggestions(
        &self,
    ) -> Result<Vec<AdvocacySuggestion>, ApiClientError> {
        self.get("/api/advocacy/suggestions").await
    }

    pub async fn get_advocacy_stats(&self) -> Result<AdvocacyStats, ApiClientError> {
        self.get("/api/advocacy/stats").await
    }

    /// Record that the signed-in user shared a post.
    pub async fn record_share(&self, post_id: &str) -> Result<ShareReceipt, ApiClientError> {
        self.post("/api/advocacy/share", Some(&ShareRequest { post_id }))
            .await
    }
}
