//! HTTP surface for the detection engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use mev_radar_heuristics::{DetectionEngine, Verdict};
use mev_radar_telemetry::{audit, Metrics};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Fields a detection request must carry before it reaches the engine.
const REQUIRED_FIELDS: [&str; 4] = ["txHash", "from", "to", "value"];

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DetectionEngine>,
    pub metrics: Metrics,
    pub sample_output_path: Option<Arc<PathBuf>>,
}

#[derive(Debug, Deserialize)]
struct UpdateBotsRequest {
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct UpdateBotsResponse {
    message: String,
    total_known_bots: usize,
}

#[derive(Serialize)]
struct AuditVerdict<'a> {
    #[serde(rename = "txHash")]
    tx_hash: &'a str,
    #[serde(flatten)]
    verdict: &'a Verdict,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/detect", post(detect))
        .route("/stats", get(stats))
        .route("/update_mev_bots", post(update_mev_bots))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Detection server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Detection server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Names of required fields absent from a request body.
fn missing_required_fields(raw: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| raw.get(*field).is_none())
        .collect()
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let raw = match payload {
        Ok(Json(raw)) if raw.as_object().is_some_and(|o| !o.is_empty()) => raw,
        Ok(_) => {
            state.metrics.inc_rejected_requests();
            return error_response(StatusCode::BAD_REQUEST, "No JSON data provided");
        }
        Err(rejection) => {
            state.metrics.inc_rejected_requests();
            warn!("Rejected detection request: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, "No JSON data provided");
        }
    };

    let missing = missing_required_fields(&raw);
    if !missing.is_empty() {
        state.metrics.inc_rejected_requests();
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {:?}", missing),
        );
    }

    let started = Instant::now();
    let verdict = state.engine.analyze_json(&raw);
    state
        .metrics
        .record_verdict(verdict.category.as_str(), started.elapsed().as_secs_f64());
    if let Ok(size) = state.engine.cache_len() {
        state.metrics.set_cache_size(size);
    }

    let tx_hash = raw.get("txHash").and_then(Value::as_str).unwrap_or("unknown");
    info!("Analyzed transaction {} - Risk Score: {}%", tx_hash, verdict.risk_score);

    if let Some(path) = state.sample_output_path.as_deref() {
        let sample = AuditVerdict {
            tx_hash,
            verdict: &verdict,
        };
        if let Err(e) = audit::write_audit_sample(Some(path), &sample) {
            warn!("Failed to write audit sample: {}", e);
        }
    }

    Json(verdict).into_response()
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.engine.stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Error in stats endpoint: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn update_mev_bots(
    State(state): State<AppState>,
    payload: Result<Json<UpdateBotsRequest>, JsonRejection>,
) -> Response {
    let addresses = match payload {
        Ok(Json(UpdateBotsRequest {
            addresses: Some(addresses),
        })) => addresses,
        Ok(_) => return error_response(StatusCode::BAD_REQUEST, "No addresses provided"),
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request: {}", rejection.body_text()),
            )
        }
    };

    match state.engine.update_known_bots(&addresses) {
        Ok(total) => {
            state.metrics.set_known_bots(total);
            Json(UpdateBotsResponse {
                message: format!("Updated {} MEV bot addresses", addresses.len()),
                total_known_bots: total,
            })
            .into_response()
        }
        Err(e) => {
            error!("Error updating MEV bots: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.gather() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use mev_radar_heuristics::AddressReputation;
    use tower::ServiceExt;

    struct Clean;

    impl AddressReputation for Clean {
        fn is_suspicious(&self, _address: &str) -> bool {
            false
        }
    }

    fn test_state() -> AppState {
        AppState {
            engine: Arc::new(DetectionEngine::default().with_reputation(Clean)),
            metrics: Metrics::new().unwrap(),
            sample_output_path: None,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn swap_request() -> Value {
        json!({
            "txHash": "0x01",
            "from": "0x5aeda56215b167893e80b4fe645ba6d5bab767de",
            "to": "0x7a250d5630b4cf539739df2c5dacb4c659f2488d",
            "value": "1.25",
            "gasPrice": "180",
            "data": "0x7ff36ab50000000000000000000000000000000000000000000000000000000000000001",
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(router(test_state()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_detect_returns_verdict() {
        let (status, body) = call(router(test_state()), post_json("/detect", swap_request())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "frontrunning");
        assert_eq!(body["riskScore"], json!(50.0));
        assert_eq!(
            body["riskFactors"],
            json!([
                "high_gas_price",
                "dex_interaction",
                "contract_interaction",
                "complex_transaction_data",
                "mev_function_signature_0x7ff36ab5"
            ])
        );
        assert!(body["analysis_details"]["gas_analysis"].is_object());
    }

    #[tokio::test]
    async fn test_detect_rejects_missing_fields() {
        let (status, body) = call(
            router(test_state()),
            post_json("/detect", json!({"txHash": "0x01", "from": "0xabc"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: [\"to\", \"value\"]");
    }

    #[tokio::test]
    async fn test_detect_rejects_non_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/detect")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = call(router(test_state()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No JSON data provided");
    }

    #[tokio::test]
    async fn test_detect_degrades_on_unusable_record() {
        let mut raw = swap_request();
        raw["from"] = json!(12345);
        let (status, body) = call(router(test_state()), post_json("/detect", raw)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "error");
        assert_eq!(body["riskFactors"], json!(["analysis_error"]));
    }

    #[tokio::test]
    async fn test_update_bots_then_detect() {
        let state = test_state();
        let app = router(state.clone());
        let bot = "0x5AEDA56215B167893E80B4FE645BA6D5BAB767DE";

        let (status, body) = call(
            app.clone(),
            post_json("/update_mev_bots", json!({"addresses": [bot, bot.to_lowercase()]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Updated 2 MEV bot addresses");
        assert_eq!(body["total_known_bots"], 3);

        let (_, verdict) = call(app, post_json("/detect", swap_request())).await;
        assert_eq!(verdict["category"], "mev_bot");
    }

    #[tokio::test]
    async fn test_update_bots_requires_addresses() {
        let (status, body) = call(
            router(test_state()),
            post_json("/update_mev_bots", json!({"bots": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No addresses provided");
    }

    #[tokio::test]
    async fn test_stats_and_metrics() {
        let state = test_state();
        let app = router(state.clone());

        call(app.clone(), post_json("/detect", swap_request())).await;
        let mut quiet = swap_request();
        quiet["gasPrice"] = json!(5);
        quiet["to"] = json!("0x");
        quiet["data"] = json!("0x");
        call(app.clone(), post_json("/detect", quiet)).await;

        let (status, stats) = call(app.clone(), get_request("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_analyzed"], 2);
        assert_eq!(stats["medium_risk_count"], 1);
        assert_eq!(stats["low_risk_count"], 1);
        assert_eq!(stats["avg_risk_score"], json!(25.0));

        let response = app.oneshot(get_request("/metrics")).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("mev_radar_transactions_analyzed_total 2"));
        assert!(text.contains("mev_radar_cache_size 2"));
    }

    #[tokio::test]
    async fn test_detect_writes_audit_sample() {
        let path = std::env::temp_dir().join(format!("mev-radar-detect-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let state = AppState {
            sample_output_path: Some(Arc::new(path.clone())),
            ..test_state()
        };

        call(router(state), post_json("/detect", swap_request())).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let sample: Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(sample["txHash"], "0x01");
        assert_eq!(sample["category"], "frontrunning");
    }
}
