use std::net::SocketAddr;
use std::time::Duration;

use jobcache_api::config::ServerConfig;
use jobcache_jobs::JobPolicy;
use reqwest::StatusCode;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: ServerConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = jobcache_api::app::build_app(&config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn fast() -> Self {
        Self::spawn(fast_config()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Millisecond-scale computations so requests finish quickly.
fn fast_config() -> ServerConfig {
    ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        policy: JobPolicy::default(),
        base_latency: Duration::from_millis(100),
        derived_latency: Duration::from_millis(50),
        request_timeout: None,
        ..ServerConfig::default()
    }
}

async fn jobs_report(client: &reqwest::Client, base_url: &str) -> serde_json::Value {
    let res = client
        .get(format!("{}/admin/jobs", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::fast().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_company_id_is_a_client_error() {
    let srv = TestServer::fast().await;
    let client = reqwest::Client::new();

    for url in [
        format!("{}/api/financials", srv.base_url),
        format!("{}/api/sales?companyId=", srv.base_url),
    ] {
        let res = client.get(url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "companyId is required");
    }

    // Validation failures never reach the job managers.
    let report = jobs_report(&client, &srv.base_url).await;
    assert_eq!(report["derived"]["misses"], 0);
}

#[tokio::test]
async fn malformed_query_is_a_json_client_error() {
    let srv = TestServer::fast().await;

    let res = reqwest::get(format!(
        "{}/api/financials?companyId=a&companyId=b",
        srv.base_url
    ))
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn unknown_kind_is_not_found() {
    let srv = TestServer::fast().await;

    let res = reqwest::get(format!("{}/api/payroll?companyId=1", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_kind");
}

#[tokio::test]
async fn financials_returns_derived_payload() {
    let srv = TestServer::fast().await;

    let res = reqwest::get(format!("{}/api/financials?companyId=123", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["content-type"], "application/json");

    let body = res.text().await.unwrap();
    assert_eq!(body, "financials-result-using-base-data-for-123");
}

#[tokio::test]
async fn concurrent_requests_share_one_job() {
    let srv = TestServer::fast().await;
    let client = reqwest::Client::new();

    let requests: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            let url = format!("{}/api/financials?companyId=123", srv.base_url);
            tokio::spawn(async move { client.get(url).send().await.unwrap() })
        })
        .collect();

    for request in requests {
        let res = request.await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.text().await.unwrap();
        assert_eq!(body, "financials-result-using-base-data-for-123");
    }

    let report = jobs_report(&client, &srv.base_url).await;
    assert_eq!(report["derived"]["misses"], 1);
    assert_eq!(report["derived"]["hits"], 4);
    assert_eq!(report["derived"]["hit_ratio"], 0.8);
    assert_eq!(report["base"]["misses"], 1);
    assert_eq!(report["base"]["live"], 1);
}

#[tokio::test]
async fn kinds_for_one_company_share_the_base_job() {
    let srv = TestServer::fast().await;
    let client = reqwest::Client::new();

    for kind in ["financials", "sales"] {
        let res = client
            .get(format!("{}/api/{}?companyId=42", srv.base_url, kind))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.text().await.unwrap();
        assert_eq!(body, format!("{kind}-result-using-base-data-for-42"));
    }

    let report = jobs_report(&client, &srv.base_url).await;
    assert_eq!(report["base"]["live"], 1);
    assert_eq!(report["base"]["misses"], 1);
    assert_eq!(report["derived"]["live"], 2);
    assert_eq!(report["base"]["entries"][0]["key"], "42");
    assert_eq!(report["base"]["entries"][0]["state"], "succeeded");
}

#[tokio::test]
async fn request_timeout_answers_408_without_cancelling_the_job() {
    let mut config = fast_config();
    config.base_latency = Duration::from_millis(1500);
    config.request_timeout = Some(Duration::from_secs(1));
    let srv = TestServer::spawn(config).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/employee?companyId=9", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "request_timeout");

    // The job kept running: a later request is served from the same record.
    tokio::time::sleep(Duration::from_millis(800)).await;
    let res = client
        .get(format!("{}/api/employee?companyId=9", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let report = jobs_report(&client, &srv.base_url).await;
    assert_eq!(report["derived"]["misses"], 1);
    assert_eq!(report["base"]["misses"], 1);
}

#[tokio::test]
async fn failed_job_is_a_server_error() {
    let mut config = fast_config();
    config.base_latency = Duration::from_secs(5);
    config.policy = JobPolicy::default()
        .with_deadlines(Duration::from_secs(20), Duration::from_secs(1));
    let srv = TestServer::spawn(config).await;

    let res = reqwest::get(format!("{}/api/sales?companyId=7", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "job_failed");
    assert_eq!(body["message"], "timeout waiting for base job");
}

#[tokio::test]
async fn request_id_is_propagated() {
    let srv = TestServer::fast().await;
    let request_id = uuid::Uuid::now_v7().to_string();

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .header("x-request-id", &request_id)
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"].to_str().unwrap(), request_id);
}
