/// REST API routes for the admin gateway.
///
/// Every `/api` route requires the gateway token. Upstream failures map to
/// `502 Bad Gateway`, caller mistakes to `400`.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::auth::ErrorResponse;
use super::middleware::GatewayAuth;
use super::AppState;
use crate::error::AdminError;
use crate::pipeline::{self, ConfigureSummary};
use crate::provision::GenerateRequest;
use crate::upstream::models::{
    BootstrapConfig, BootstrapConfigs, ObjectSpec, Registration, SecurityConfig,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a crate error to a response, logging upstream trouble.
fn api_error(context: &str, e: AdminError) -> ApiError {
    let status = match &e {
        AdminError::Validation(_) => StatusCode::BAD_REQUEST,
        AdminError::Upstream { .. } | AdminError::Http(_) | AdminError::Serialization(_) => {
            StatusCode::BAD_GATEWAY
        }
        AdminError::Config(_) | AdminError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status != StatusCode::BAD_REQUEST {
        error!(error = %e, "{context}");
    }

    (status, Json(ErrorResponse::new(format!("{context}: {e}"))))
}

// ─── Health ──────────────────────────────────────────────

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

// ─── Clients & Security ──────────────────────────────────

#[derive(Debug, Serialize)]
struct ClientsResponse {
    clients: Vec<Registration>,
}

#[derive(Debug, Serialize)]
struct ClientResponse {
    client: Registration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectSpecsResponse {
    object_specs: Vec<ObjectSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SecurityConfResponse {
    security_conf: Vec<SecurityConfig>,
}

/// GET /api/clients: Registered clients.
async fn list_clients(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientsResponse>, ApiError> {
    let clients = state
        .upstream
        .list_clients()
        .await
        .map_err(|e| api_error("Failed to fetch clients", e))?;

    Ok(Json(ClientsResponse { clients }))
}

/// GET /api/clients/{client_id}: One registered client.
async fn get_client(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state
        .upstream
        .get_client(&client_id)
        .await
        .map_err(|e| api_error("Failed to fetch client", e))?;

    Ok(Json(ClientResponse { client }))
}

/// GET /api/objectspecs/{client_id}: Object models of a client.
async fn object_specs(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Json<ObjectSpecsResponse>, ApiError> {
    let object_specs = state
        .upstream
        .object_specs(&client_id)
        .await
        .map_err(|e| api_error("Failed to fetch client object specs", e))?;

    Ok(Json(ObjectSpecsResponse { object_specs }))
}

/// GET /api/clients/securityconf: All security configurations.
async fn list_security_configs(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SecurityConfResponse>, ApiError> {
    let security_conf = state
        .upstream
        .list_security_configs()
        .await
        .map_err(|e| api_error("Failed to fetch security configurations", e))?;

    Ok(Json(SecurityConfResponse { security_conf }))
}

/// PUT /api/clients: Create or replace a security configuration.
async fn put_security_config(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Json(config): Json<SecurityConfig>,
) -> Result<StatusCode, ApiError> {
    if config.endpoint.trim().is_empty() {
        return Err(api_error(
            "Failed to store security config",
            AdminError::Validation("endpoint is required".into()),
        ));
    }

    state
        .upstream
        .put_security_config(&config)
        .await
        .map_err(|e| api_error("Failed to store security config", e))?;

    info!(endpoint = %config.endpoint, "Security config stored");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/clients/{client_id}: Remove a security configuration.
async fn delete_security_config(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .upstream
        .delete_security_config(&client_id)
        .await
        .map_err(|e| api_error("Failed to delete security config", e))?;

    info!(endpoint = %client_id, "Security config deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn client_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/clients", get(list_clients).put(put_security_config))
        .route("/api/clients/securityconf", get(list_security_configs))
        .route(
            "/api/clients/{client_id}",
            get(get_client).delete(delete_security_config),
        )
        .route("/api/objectspecs/{client_id}", get(object_specs))
}

// ─── Bootstrap ───────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BootstrapConfigsResponse {
    bs_clients: BootstrapConfigs,
}

/// Request to store a bootstrap configuration.
#[derive(Debug, Deserialize)]
struct PostBootstrapRequest {
    config: BootstrapConfig,
}

/// GET /api/bsclients: All bootstrap configurations.
async fn list_bootstrap_configs(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BootstrapConfigsResponse>, ApiError> {
    let bs_clients = state
        .upstream
        .list_bootstrap_configs()
        .await
        .map_err(|e| api_error("Failed to fetch bootstrap configs", e))?;

    Ok(Json(BootstrapConfigsResponse { bs_clients }))
}

/// POST /api/bsclients/{client_id}: Create or replace a bootstrap configuration.
async fn post_bootstrap_config(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Json(req): Json<PostBootstrapRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .upstream
        .put_bootstrap_config(&client_id, &req.config)
        .await
        .map_err(|e| api_error("Failed to add bootstrap config", e))?;

    info!(endpoint = %client_id, "Bootstrap config stored");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/bsclients/{client_id}: Remove a bootstrap configuration.
async fn delete_bootstrap_config(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .upstream
        .delete_bootstrap_config(&client_id)
        .await
        .map_err(|e| api_error("Failed to delete bootstrap config", e))?;

    info!(endpoint = %client_id, "Bootstrap config deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn bootstrap_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bsclients", get(list_bootstrap_configs))
        .route(
            "/api/bsclients/{client_id}",
            post(post_bootstrap_config).delete(delete_bootstrap_config),
        )
}

// ─── Bulk generation ─────────────────────────────────────

/// POST /api/configs/generate: Provision a range of devices.
async fn generate_configs(
    _auth: GatewayAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ConfigureSummary>, ApiError> {
    let template = req
        .validate()
        .map_err(|e| api_error("Invalid parameters", e))?;

    info!(
        prefix = template.prefix(),
        count = template.count(),
        "Bulk generate request"
    );

    let summary = pipeline::run_bulk_generate(
        state.upstream.as_ref(),
        state.pacer.as_ref(),
        &template,
        &state.pipeline,
    )
    .await;

    Ok(Json(summary))
}

pub fn generate_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/configs/generate", post(generate_configs))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{UpstreamAuth, UpstreamConfig};
    use crate::pacing::NoDelay;
    use crate::pipeline::PipelineConfig;
    use crate::server::build_app;
    use crate::upstream::LeshanClient;

    const TOKEN: &str = "gateway-token";

    /// Start the gateway on an ephemeral port, proxying to `upstream`.
    async fn spawn_gateway(upstream: &MockServer) -> String {
        let config =
            UpstreamConfig::new(&upstream.uri(), UpstreamAuth::None, Duration::from_secs(5))
                .unwrap();
        let state = AppState {
            upstream: Arc::new(LeshanClient::new(config).unwrap()),
            pacer: Arc::new(NoDelay),
            pipeline: PipelineConfig::default(),
            gateway_token: TOKEN.to_string(),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(state)).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn accept_writes(server: &MockServer) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let upstream = MockServer::start().await;
        let base = spawn_gateway(&upstream).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_token_required() {
        let upstream = MockServer::start().await;
        let base = spawn_gateway(&upstream).await;
        let http = reqwest::Client::new();

        let resp = http.get(format!("{base}/api/clients")).send().await.unwrap();
        assert_eq!(resp.status(), 401);

        let resp = http
            .get(format!("{base}/api/clients"))
            .bearer_auth("wrong")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], json!("Invalid token"));

        assert!(upstream.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_clients_proxied() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "endpoint": "Sensor01", "registrationId": "r1", "lifetime": 300 }
            ])))
            .mount(&upstream)
            .await;
        let base = spawn_gateway(&upstream).await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/api/clients"))
            .header("X-Auth-Token", TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["clients"][0]["endpoint"], json!("Sensor01"));
        assert_eq!(body["clients"][0]["lifetime"], json!(300));
    }

    #[tokio::test]
    async fn test_security_listing_not_shadowed_by_client_route() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clients/securityconf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "endpoint": "Sensor01", "edhoc": { "ciphersuite": "2" } }
            ])))
            .mount(&upstream)
            .await;
        let base = spawn_gateway(&upstream).await;

        let body: Value = reqwest::Client::new()
            .get(format!("{base}/api/clients/securityconf"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["securityConf"][0]["edhoc"]["ciphersuite"], json!("2"));
    }

    #[tokio::test]
    async fn test_object_specs_wrapped() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/objectspecs/Sensor01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 3, "name": "Device", "resourcedefs": [] }
            ])))
            .mount(&upstream)
            .await;
        let base = spawn_gateway(&upstream).await;

        let body: Value = reqwest::Client::new()
            .get(format!("{base}/api/objectspecs/Sensor01"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["objectSpecs"][0]["name"], json!("Device"));
        assert!(body.get("client").is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bsclients"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&upstream)
            .await;
        let base = spawn_gateway(&upstream).await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/api/bsclients"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 502);

        let body: Value = resp.json().await.unwrap();
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Failed to fetch bootstrap configs"));
        assert!(error.contains("maintenance"));
    }

    #[tokio::test]
    async fn test_bootstrap_write_and_delete() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/bsclients/Sensor09"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&upstream)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/bsclients/Sensor09"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&upstream)
            .await;
        let base = spawn_gateway(&upstream).await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{base}/api/bsclients/Sensor09"))
            .bearer_auth(TOKEN)
            .json(&json!({
                "config": {
                    "servers": { "0": { "shortId": 123, "lifetime": 300, "binding": "U" } },
                    "security": { "0": { "uri": "coap://localhost:5683", "bootstrapServer": true } }
                }
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = http
            .delete(format!("{base}/api/bsclients/Sensor09"))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
    }

    #[tokio::test]
    async fn test_security_put_requires_endpoint() {
        let upstream = MockServer::start().await;
        let base = spawn_gateway(&upstream).await;

        let resp = reqwest::Client::new()
            .put(format!("{base}/api/clients"))
            .bearer_auth(TOKEN)
            .json(&json!({ "endpoint": " " }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert!(upstream.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_rejects_out_of_range() {
        let upstream = MockServer::start().await;
        let base = spawn_gateway(&upstream).await;
        let http = reqwest::Client::new();

        for body in [
            json!({ "devicePrefix": "Sensor", "startNumber": 1, "count": 101, "paddingLength": 2 }),
            json!({ "devicePrefix": "Sensor", "startNumber": 1, "count": 0, "paddingLength": 2 }),
            json!({ "devicePrefix": "Sensor", "startNumber": 1, "count": 1, "paddingLength": 0 }),
            json!({ "devicePrefix": "Sensor", "startNumber": 1, "count": 1, "paddingLength": 7 }),
            json!({ "devicePrefix": "  ", "startNumber": 1, "count": 1, "paddingLength": 2 }),
        ] {
            let resp = http
                .post(format!("{base}/api/configs/generate"))
                .bearer_auth(TOKEN)
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 400, "body {body} should be rejected");
        }

        assert!(upstream.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let upstream = MockServer::start().await;
        accept_writes(&upstream).await;
        let base = spawn_gateway(&upstream).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/configs/generate"))
            .bearer_auth(TOKEN)
            .json(&json!({ "devicePrefix": "Sensor", "startNumber": 1, "count": 2, "paddingLength": 2 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["successful"], json!(2));
        assert_eq!(body["total"], json!(2));
        assert_eq!(body["results"][0]["endpoint"], json!("Sensor01"));
        assert_eq!(body["results"][0]["oscore"]["masterSecret"], json!("0001"));
        assert_eq!(body["results"][1]["endpoint"], json!("Sensor02"));
        assert_eq!(body["results"][1]["oscore"]["masterSecret"], json!("0002"));
    }

    #[tokio::test]
    async fn test_generate_accepts_maximum_count() {
        let upstream = MockServer::start().await;
        accept_writes(&upstream).await;
        let base = spawn_gateway(&upstream).await;

        let body: Value = reqwest::Client::new()
            .post(format!("{base}/api/configs/generate"))
            .bearer_auth(TOKEN)
            .json(&json!({ "devicePrefix": "D", "startNumber": 1, "count": 100, "paddingLength": 3 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["total"], json!(100));
        assert_eq!(body["successful"], json!(100));
        assert_eq!(body["results"][99]["endpoint"], json!("D100"));
    }
}
