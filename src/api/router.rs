//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/v1`.
//! All routes require bearer token authentication.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (via `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route("/scans/upload", post(endpoints::scans::upload))
        .route("/scans/:scan_id", get(endpoints::scans::detail))
        .route("/scans/:scan_id/analyze", post(endpoints::scans::analyze))
        .route("/scans/:scan_id/result", patch(endpoints::scans::correct))
        .route("/scans/:scan_id/save", post(endpoints::scans::save))
        .route("/medications/history", get(endpoints::medications::history))
        .route("/medications/days/:date", get(endpoints::medications::day))
        .route(
            "/medications/logs/:log_id",
            patch(endpoints::medications::set_status),
        )
        .route("/health/history", get(endpoints::health::history))
        .route("/health/days/:date", get(endpoints::health::day))
        .route("/health/logs/:log_id", patch(endpoints::health::set_status))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api/v1", protected)
        // Body cap sits above the file cap to leave room for multipart framing
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES + 64 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rusqlite::Connection;
    use tower::ServiceExt;

    use crate::api::types::hash_token;
    use crate::db::{open_database, repository};
    use crate::ocr::{MockOcrClient, OcrError};
    use crate::pipeline::ScanPipeline;

    const TOKEN: &str = "dev-token";

    // -- Helpers ---------------------------------------------------------

    struct TestApp {
        _dir: tempfile::TempDir,
        db_path: PathBuf,
        app: Router,
        user_id: i64,
    }

    impl TestApp {
        fn conn(&self) -> Connection {
            open_database(&self.db_path).unwrap()
        }
    }

    fn clova_page(tokens: &[&str]) -> serde_json::Value {
        let fields: Vec<serde_json::Value> = tokens
            .iter()
            .map(|t| serde_json::json!({"inferText": t}))
            .collect();
        serde_json::json!({"images": [{"name": "page-1", "fields": fields}]})
    }

    fn test_app_with(ocr: MockOcrClient) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("mediscan.db");

        let user_id = {
            let conn = open_database(&db_path).unwrap();
            repository::insert_user(&conn, "local", &hash_token(TOKEN)).unwrap()
        };

        let pipeline =
            ScanPipeline::new(db_path.clone(), dir.path().join("uploads"), Arc::new(ocr));
        let app = api_router(ApiContext::new(db_path.clone(), pipeline));

        TestApp {
            _dir: dir,
            db_path,
            app,
            user_id,
        }
    }

    /// App whose provider returns a page with a recognizable date and two
    /// drug-looking tokens.
    fn test_app() -> TestApp {
        test_app_with(MockOcrClient::new(clova_page(&[
            "처방일자",
            "2026.02.19",
            "Aspirin",
            "Metformin",
        ])))
    }

    fn make_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(
        method: &str,
        uri: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(token: &str, filename: &str, contents: &[u8]) -> Request<Body> {
        let boundary = "router-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/scans/upload")
            .header("Authorization", format!("Bearer {token}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(test: &TestApp, req: Request<Body>) -> axum::response::Response {
        test.app.clone().oneshot(req).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// upload + analyze, returning the scan id. Used by the save tests.
    async fn uploaded_and_analyzed(test: &TestApp) -> i64 {
        let response = send(test, upload_request(TOKEN, "rx.jpg", b"jpeg-bytes")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let scan_id = body_json(response).await["scan_id"].as_i64().unwrap();

        let uri = format!("/api/v1/scans/{scan_id}/analyze");
        let response = send(test, make_request("POST", &uri, Some(TOKEN))).await;
        assert_eq!(response.status(), StatusCode::OK);
        scan_id
    }

    // -- Auth ------------------------------------------------------------

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let test = test_app();
        let req = make_request("GET", "/api/v1/medications/history", None);
        let response = send(&test, req).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let test = test_app();
        let req = make_request("GET", "/api/v1/medications/history", Some("wrong-token"));
        let response = send(&test, req).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let test = test_app();
        let req = make_request("GET", "/api/v1/nothing-here", Some(TOKEN));
        let response = send(&test, req).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -- Scan workflow ----------------------------------------------------

    #[tokio::test]
    async fn upload_analyze_correct_save_flow() {
        let test = test_app();

        // Upload
        let response = send(&test, upload_request(TOKEN, "rx.jpg", b"jpeg-bytes")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "uploaded");
        let scan_id = json["scan_id"].as_i64().unwrap();

        // Analyze
        let uri = format!("/api/v1/scans/{scan_id}/analyze");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "done");

        // Extraction found the date but, by contract, no drugs or diagnosis
        let uri = format!("/api/v1/scans/{scan_id}");
        let json = body_json(send(&test, make_request("GET", &uri, Some(TOKEN))).await).await;
        assert_eq!(json["document_date"], "2026-02-19");
        assert!(json["diagnosis"].is_null());
        assert_eq!(json["drug_names"], serde_json::json!([]));

        // Correct: supply what the parser does not extract
        let uri = format!("/api/v1/scans/{scan_id}/result");
        let correction = serde_json::json!({
            "diagnosis": "Cold",
            "drug_names": ["Aspirin", "Metformin"],
        });
        let response = send(&test, json_request("PATCH", &uri, TOKEN, correction)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "updated");
        assert_eq!(json["drug_names"], serde_json::json!(["Aspirin", "Metformin"]));

        // Save
        let uri = format!("/api/v1/scans/{scan_id}/save");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["saved"], true);
        assert_eq!(json["seeded_date"], "2026-02-19");
        assert_eq!(json["created_prescriptions"], 2);

        // Reconciliation landed: prescriptions plus both checklists
        let conn = test.conn();
        let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
        assert_eq!(
            repository::count_prescriptions_for_owner(&conn, test.user_id).unwrap(),
            2
        );
        assert_eq!(
            repository::get_medication_day(&conn, test.user_id, date)
                .unwrap()
                .len(),
            4
        );
        assert_eq!(
            repository::get_health_day(&conn, test.user_id, date)
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn upload_with_unsupported_extension_is_rejected() {
        let test = test_app();
        let response = send(&test, upload_request(TOKEN, "notes.txt", b"plain text")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn upload_without_file_part_is_rejected() {
        let test = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/scans/upload")
            .header("Authorization", format!("Bearer {TOKEN}"))
            .header(
                "Content-Type",
                "multipart/form-data; boundary=router-test-boundary",
            )
            .body(Body::from(
                "--router-test-boundary--\r\n".as_bytes().to_vec(),
            ))
            .unwrap();

        let response = send(&test, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn another_users_scan_is_forbidden_not_hidden() {
        let test = test_app();
        repository::insert_user(&test.conn(), "intruder", &hash_token("intruder-token"))
            .unwrap();

        let response = send(&test, upload_request(TOKEN, "rx.jpg", b"jpeg-bytes")).await;
        let scan_id = body_json(response).await["scan_id"].as_i64().unwrap();

        let uri = format!("/api/v1/scans/{scan_id}");
        let response = send(&test, make_request("GET", &uri, Some("intruder-token"))).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn missing_scan_returns_404() {
        let test = test_app();
        let response = send(&test, make_request("GET", "/api/v1/scans/4242", Some(TOKEN))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn correction_with_malformed_date_is_rejected() {
        let test = test_app();
        let scan_id = uploaded_and_analyzed(&test).await;

        let uri = format!("/api/v1/scans/{scan_id}/result");
        let correction = serde_json::json!({"document_date": "19-02-2026"});
        let response = send(&test, json_request("PATCH", &uri, TOKEN, correction)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn save_without_document_date_is_rejected() {
        // Provider text carries no recognizable date
        let test = test_app_with(MockOcrClient::new(clova_page(&["Aspirin", "only"])));
        let scan_id = uploaded_and_analyzed(&test).await;

        let uri = format!("/api/v1/scans/{scan_id}/save");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");

        // State unchanged, nothing committed
        let uri = format!("/api/v1/scans/{scan_id}");
        let json = body_json(send(&test, make_request("GET", &uri, Some(TOKEN))).await).await;
        assert_eq!(json["status"], "done");
        assert_eq!(
            repository::count_prescriptions_for_owner(&test.conn(), test.user_id).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn second_save_is_an_invalid_state() {
        let test = test_app();
        let scan_id = uploaded_and_analyzed(&test).await;

        let uri = format!("/api/v1/scans/{scan_id}/save");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_STATE");

        // No extra rows from the rejected save (no corrections, so no drugs)
        assert_eq!(
            repository::count_prescriptions_for_owner(&test.conn(), test.user_id).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn rate_limited_provider_maps_to_429_with_retry_after() {
        let test = test_app_with(MockOcrClient::failing(|| OcrError::RateLimited));
        let response = send(&test, upload_request(TOKEN, "rx.jpg", b"jpeg-bytes")).await;
        let scan_id = body_json(response).await["scan_id"].as_i64().unwrap();

        let uri = format!("/api/v1/scans/{scan_id}/analyze");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("Retry-After"));
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "OCR_RATE_LIMITED");

        // The scan settled in `failed` and stays retryable
        let uri = format!("/api/v1/scans/{scan_id}");
        let json = body_json(send(&test, make_request("GET", &uri, Some(TOKEN))).await).await;
        assert_eq!(json["status"], "failed");
    }

    #[tokio::test]
    async fn provider_timeout_maps_to_504() {
        let test = test_app_with(MockOcrClient::failing(|| OcrError::Timeout(30)));
        let response = send(&test, upload_request(TOKEN, "rx.jpg", b"jpeg-bytes")).await;
        let scan_id = body_json(response).await["scan_id"].as_i64().unwrap();

        let uri = format!("/api/v1/scans/{scan_id}/analyze");
        let response = send(&test, make_request("POST", &uri, Some(TOKEN))).await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "OCR_TIMEOUT");
    }

    // -- Tracking ----------------------------------------------------------

    #[tokio::test]
    async fn medication_day_seeds_and_updates() {
        let test = test_app();

        let uri = "/api/v1/medications/days/2026-03-01";
        let json = body_json(send(&test, make_request("GET", uri, Some(TOKEN))).await).await;
        assert_eq!(json["date"], "2026-03-01");
        assert_eq!(json["rate"], 0);
        assert_eq!(json["bucket"], "bad");
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 4);

        let log_id = items[0]["id"].as_i64().unwrap();
        let uri = format!("/api/v1/medications/logs/{log_id}");
        let response = send(
            &test,
            json_request("PATCH", &uri, TOKEN, serde_json::json!({"status": "taken"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["updated"], true);
        assert_eq!(json["day"]["rate"], 25);
    }

    #[tokio::test]
    async fn unknown_intake_status_is_rejected() {
        let test = test_app();

        let uri = "/api/v1/medications/days/2026-03-01";
        let json = body_json(send(&test, make_request("GET", uri, Some(TOKEN))).await).await;
        let log_id = json["items"][0]["id"].as_i64().unwrap();

        let uri = format!("/api/v1/medications/logs/{log_id}");
        let response = send(
            &test,
            json_request("PATCH", &uri, TOKEN, serde_json::json!({"status": "bogus"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn medication_history_defaults_to_thirty_days() {
        let test = test_app();

        let uri = "/api/v1/medications/history";
        let json = body_json(send(&test, make_request("GET", uri, Some(TOKEN))).await).await;
        let items = json["items"].as_array().unwrap();

        assert_eq!(items.len(), 30);
        // Newest first
        let today = chrono::Local::now().date_naive().to_string();
        assert_eq!(items[0]["date"], today);
    }

    #[tokio::test]
    async fn inverted_history_range_is_rejected() {
        let test = test_app();

        let uri = "/api/v1/medications/history?from=2026-03-05&to=2026-03-01";
        let response = send(&test, make_request("GET", uri, Some(TOKEN))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn malformed_day_date_is_rejected() {
        let test = test_app();
        let response = send(
            &test,
            make_request("GET", "/api/v1/medications/days/not-a-date", Some(TOKEN)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_day_seeds_and_updates() {
        let test = test_app();

        let uri = "/api/v1/health/days/2026-03-01";
        let json = body_json(send(&test, make_request("GET", uri, Some(TOKEN))).await).await;
        assert_eq!(json["rate"], 0);
        assert_eq!(json["bucket"], "bad");
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);

        let log_id = items[0]["id"].as_i64().unwrap();
        let uri = format!("/api/v1/health/logs/{log_id}");
        let response = send(
            &test,
            json_request("PATCH", &uri, TOKEN, serde_json::json!({"status": "done"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["day"]["rate"], 33);
    }

    #[tokio::test]
    async fn health_history_honors_explicit_range() {
        let test = test_app();

        let uri = "/api/v1/health/history?from=2026-03-01&to=2026-03-03";
        let json = body_json(send(&test, make_request("GET", uri, Some(TOKEN))).await).await;
        let items = json["items"].as_array().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["date"], "2026-03-03");
        assert_eq!(items[2]["date"], "2026-03-01");
    }
}
