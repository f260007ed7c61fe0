use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock portal built on `wiremock`. Serves the OAuth2 token endpoint and
/// the server-token endpoint with configurable behavior.
pub struct MockPortalServer {
    server: MockServer,
}

impl MockPortalServer {
    pub const TOKEN_PATH: &'static str = "/sharing/rest/oauth2/token";
    pub const GENERATE_TOKEN_PATH: &'static str = "/sharing/rest/generateToken";

    /// Start a new mock server on a random available port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock server (e.g. "http://127.0.0.1:PORT").
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.url(), Self::TOKEN_PATH)
    }

    pub fn generate_token_url(&self) -> String {
        format!("{}{}", self.url(), Self::GENERATE_TOKEN_PATH)
    }

    /// Mount a handler that answers `POST <endpoint>` with HTTP 200 and the
    /// given JSON body.
    pub async fn mock_success(&self, endpoint: &str, response: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response))
            .mount(&self.server)
            .await;
    }

    /// Mount a handler that returns HTTP 200 with a portal-style error
    /// object (`{"error": {"code", "message", "details"}}`).
    pub async fn mock_portal_error(&self, endpoint: &str, code: u16, message: &str) {
        let body = serde_json::json!({
            "error": { "code": code, "message": message, "details": [] }
        });
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.server)
            .await;
    }

    /// Mount a handler that returns an OAuth2 error response (HTTP 400).
    pub async fn mock_oauth_error(&self, endpoint: &str, error: &str, description: &str) {
        let body = serde_json::json!({
            "error": error,
            "error_description": description,
        });
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(400).set_body_json(&body))
            .mount(&self.server)
            .await;
    }

    /// Mount a handler that returns a bare status with an empty body.
    pub async fn mock_unexpected_status(&self, endpoint: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Assert that the last request contained the expected form-urlencoded
    /// parameters in its body.
    pub async fn verify_form(&self, expected_params: &[(&str, &str)]) {
        let requests = self
            .server
            .received_requests()
            .await
            .expect("request recording enabled");
        let last = requests.last().expect("expected at least one request");
        let body_str = String::from_utf8(last.body.clone()).expect("body should be UTF-8");
        let parsed: Vec<(String, String)> = url::form_urlencoded::parse(body_str.as_bytes())
            .into_owned()
            .collect();

        for (key, value) in expected_params {
            let found = parsed.iter().any(|(k, v)| k == key && v == value);
            assert!(
                found,
                "expected form param {}={} in request body, got: {}",
                key, value, body_str
            );
        }
    }
}
