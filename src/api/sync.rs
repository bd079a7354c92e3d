use crate::api::types::{SyncResult, SyncStatus};
use crate::api::{ApiClient, ApiClientError};

impl ApiClient {
    pub async fn get_sync_status(&self) -> Result<SyncStatus, ApiClientError> {
        self.get("/api/sync/status").await
    }

    /// Run a sync job. The backend answers only once the job has finished,
    /// and no timeout is applied on this side.
    pub async fn trigger_sync(&self) -> Result<SyncResult, ApiClientError> {
        self.post::<SyncResult, ()>("/api/sync/trigger", None).await
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::ApiClient;
    use crate::session::SessionStore;

    #[tokio::test]
    async fn trigger_returns_counts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sync/trigger"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "postsProcessed": 4,
                "engagementsFound": 17,
                "mockMode": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory());
        let result = client.trigger_sync().await.unwrap();
        assert_eq!(result.posts_processed, 4);
        assert_eq!(result.engagements_found, 17);
        assert!(result.mock_mode);
    }

    #[tokio::test]
    async fn failed_trigger_carries_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sync/trigger"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"error": "Sync already running"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory());
        let err = client.trigger_sync().await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.reason().as_deref(), Some("Sync already running"));
    }
}
