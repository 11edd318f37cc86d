use std::sync::Once;

use tracing::info;
use url::Url;
use wave_rs::Client;
use wiremock::MockServer;

static LOGGING_CONFIGURED: Once = Once::new();

/// Setup before test runs
pub fn do_setup() {
    LOGGING_CONFIGURED.call_once(|| tracing_subscriber::fmt().with_test_writer().init());
    info!("Setting up test environment");
}

/// Starts a mock API server and a client pointed at it.
#[allow(dead_code)]
pub async fn mock_client() -> (MockServer, Client) {
    do_setup();
    let server = MockServer::start().await;
    let client = Client::default().with_base_url(Url::parse(&server.uri()).unwrap());
    (server, client)
}

/// Asserts that the mock server never saw a request.
#[allow(dead_code)]
pub async fn assert_no_requests(server: &MockServer) {
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "expected no requests, got {received:?}");
}
