use crate::api::types::{EngagementRow, EngagementStats, Period};
use crate::api::{ApiClient, ApiClientError};

impl ApiClient {
    /// Summary counters for the profile header.
    pub async fn get_engagement_stats(&self) -> Result<EngagementStats, ApiClientError> {
        self.get("/api/engagement/stats").await
    }

    /// Ranked leaderboard for a period. Rows come back in rank order and are
    /// never re-sorted on this side.
    pub async fn get_leaderboard(
        &self,
        period: Period,
    ) -> Result<Vec<EngagementRow>, ApiClientError> {
        self.get(&format!("/api/engagement/leaderboard?period={period}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::ApiClient;
    use crate::api::types::Period;
    use crate::session::SessionStore;

    #[tokio::test]
    async fn leaderboard_keeps_backend_order_for_ties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/engagement/leaderboard"))
            .and(query_param("period", "month"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"sub": "b", "reactions": 6, "comments": 4},
                {"sub": "a", "reactions": 10, "comments": 0},
                {"sub": "c", "reactions": 5, "comments": 0}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory());
        let rows = client.get_leaderboard(Period::Month).await.unwrap();
        let subs: Vec<&str> = rows.iter().map(|r| r.sub.as_str()).collect();
        assert_eq!(subs, ["b", "a", "c"]);
        let totals: Vec<u64> = rows.iter().map(|r| r.total()).collect();
        assert_eq!(totals, [10, 10, 5]);
    }

    #[tokio::test]
    async fn stats_tolerate_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/engagement/stats"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reactions": 4})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory());
        let stats = client.get_engagement_stats().await.unwrap();
        assert_eq!(stats.reactions, 4);
        assert_eq!(stats.comments, 0);
        assert_eq!(stats.rank, None);
    }
}
