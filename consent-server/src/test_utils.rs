use crate::auth::token::tests::{sign_token, TEST_SECRET};
use crate::config::ServerConfig;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

/// Test fixture for exercising the HTTP API end to end.
///
/// The fixture builds the full application router over an in-memory consent
/// store and signs an access token that is attached to every request made
/// through its helpers.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     // Token carrying the read scope only
///     let fixture = TestFixture::with_scopes("consent.authorizations.get").await;
///
///     let response = fixture.get("/authorizations?id=u1&app=app1&client_id=c1").await;
///     response.assert_status(StatusCode::NOT_FOUND);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Access token sent as `Authorization: Bearer <token>`
    pub token: String,
}

impl TestFixture {
    /// Creates a fixture whose token carries every scope of the default policy
    pub async fn new() -> Self {
        Self::with_scopes(
            "consent.authorizations.get consent.authorizations.post consent.authorizations.update",
        )
        .await
    }

    /// Creates a fixture whose token carries the given space-separated scopes
    pub async fn with_scopes(scopes: &str) -> Self {
        Self::with_config(ServerConfig::for_test(TEST_SECRET), scopes).await
    }

    /// Creates a fixture from an explicit configuration.
    ///
    /// The configuration must verify HS256 tokens signed with the test secret.
    pub async fn with_config(config: ServerConfig, scopes: &str) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let state = AppState::for_testing(&config);
        let app = create_app(state).await;

        Self {
            app,
            token: sign_token(scopes, 300),
        }
    }

    /// Replaces the access token sent with each request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Initializes the test logger with the given level.
    ///
    /// Called by every constructor; repeated calls are no-ops.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder with the bearer token and JSON content type set
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
    }

    /// Sends an authenticated GET request to the specified URI
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends an authenticated POST request with a JSON body
    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    ///
    /// Use this for requests the convenience helpers cannot express, such as
    /// missing credentials or malformed bodies.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// The response body as JSON
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Value of a response header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
