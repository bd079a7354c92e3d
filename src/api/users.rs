use crate::api::types::{EngagementRow, Identity};
use crate::api::{ApiClient, ApiClientError, encode_component};

impl ApiClient {
    /// Resolve the signed-in user. A 401 here means "not signed in".
    pub async fn get_identity(&self) -> Result<Identity, ApiClientError> {
        self.get("/api/user").await
    }

    /// Flat team list with per-user engagement counters.
    pub async fn get_team(&self, limit: u32) -> Result<Vec<EngagementRow>, ApiClientError> {
        self.get(&format!("/api/users?limit={limit}")).await
    }

    /// Avatar image URL for a subject. The asset is served without auth.
    pub fn avatar_url(&self, subject_id: &str) -> String {
        self.url(&format!("/api/avatar/{}", encode_component(subject_id)))
            .map(|u| u.to_string())
            .unwrap_or_default()
    }

    /// Full-page sign-in entry point.
    pub fn login_url(&self) -> String {
        self.url("/login").map(|u| u.to_string()).unwrap_or_default()
    }

    /// Full-page sign-out entry point.
    pub fn logout_url(&self) -> String {
        self.url("/logout").map(|u| u.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::ApiClient;
    use crate::session::SessionStore;

    #[tokio::test]
    async fn team_passes_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"sub": "a", "name": "Ann", "reactions": 2, "comments": 1, "emailVerified": true},
                {"sub": "b"}
            ])))
            .mount(&server)
            .await;

        let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), SessionStore::in_memory());
        let team = client.get_team(50).await.unwrap();
        assert_eq!(team.len(), 2);
        assert_eq!(team[0].total(), 3);
        assert!(team[0].email_verified);
        assert_eq!(team[1].name, "");
    }

    #[test]
    fn entry_point_urls() {
        let client = ApiClient::new(
            Url::parse("http://localhost:3003").unwrap(),
            SessionStore::in_memory(),
        );
        assert_eq!(client.login_url(), "http://localhost:3003/login");
        assert_eq!(client.logout_url(), "http://localhost:3003/logout");
        assert_eq!(
            client.avatar_url("li:abc"),
            "http://localhost:3003/api/avatar/li%3Aabc"
        );
    }
}
