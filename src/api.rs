//! REST API for minichain
//!
//! Thin adapter over [`Node`]: request bodies are checked for required
//! fields here, everything else is decided by the core.

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::blockchain::Block;
use crate::error::ChainError;
use crate::node::{ChainSnapshot, MiningContext, Node};
use crate::transaction::AccountSummary;

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Chain(ChainError),
    InvalidInput(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Chain(ChainError::InvalidProof { proof }) => (
                StatusCode::BAD_REQUEST,
                format!("Failure. {} is not a valid proof", proof),
            ),
            ApiError::Chain(ChainError::MalformedRequest(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Chain(ChainError::SearchCancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Proof search was cancelled".to_string(),
            ),
            ApiError::Chain(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::Chain(err)
    }
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Fields are optional so that a missing one is reported as a malformed
/// request rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Number>,
}

#[derive(Debug, Deserialize)]
pub struct MineRequest {
    /// Identifier of the submitting miner.
    pub id: Option<String>,
    /// Raw JSON; anything but a non-negative integer is an invalid proof.
    pub proof: Option<Value>,
    pub previous_hash: Option<String>,
}

impl MineRequest {
    fn proof(&self) -> Result<Option<u64>, ApiError> {
        match &self.proof {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                let shown = value.as_str().map_or_else(|| value.to_string(), str::to_string);
                ApiError::InvalidInput(format!("Failure. {} is not a valid proof", shown))
            }),
        }
    }
}

#[derive(Serialize)]
pub struct NewTransactionResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Serialize)]
pub struct LastBlockResponse {
    pub last_block: Block,
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

pub fn build_api_router(node: Node) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/transactions/new", post(submit_transaction))
        .route("/mine", post(mine))
        .route("/mining/context", get(get_mining_context))
        .route("/chain", get(get_chain))
        .route("/last_block", get(get_last_block))
        .route("/wallet/:id", get(get_wallet))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(node)
        .layer(cors)
}

/// Serves the API on `addr` until `shutdown` resolves.
pub async fn run_api_server(
    node: Node,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ChainError> {
    let app = build_api_router(node);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(node): State<Node>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "node_id": node.identity().as_str(),
        "mode": node.mining_config().mode.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn submit_transaction(
    State(node): State<Node>,
    Json(req): Json<NewTransactionRequest>,
) -> Result<(StatusCode, Json<NewTransactionResponse>), ApiError> {
    let (sender, recipient, amount) = match (req.sender, req.recipient, req.amount) {
        (Some(sender), Some(recipient), Some(amount)) => (sender, recipient, amount),
        _ => {
            return Err(ApiError::InvalidInput(
                "Missing values. Must provide sender, recipient and amount".to_string(),
            ))
        }
    };

    let index = node.submit_transaction(sender, recipient, amount);

    Ok((
        StatusCode::CREATED,
        Json(NewTransactionResponse {
            message: format!("Transaction will be added to block {}", index),
            index,
        }),
    ))
}

async fn mine(
    State(node): State<Node>,
    Json(req): Json<MineRequest>,
) -> Result<Json<MineResponse>, ApiError> {
    let miner_id = req.id.clone().ok_or_else(|| {
        ApiError::InvalidInput("Please provide an id and a proof in request body".to_string())
    })?;
    let proof = req.proof()?;
    info!(miner = %miner_id, proof = ?proof, "mine requested");

    // Server mode may run an unbounded search; keep it off the async workers.
    let block = tokio::task::spawn_blocking(move || {
        node.mine(proof, req.previous_hash.as_deref())
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Mining task failed: {}", e)))??;

    Ok(Json(MineResponse {
        message: "New Block Forged".to_string(),
        block,
    }))
}

async fn get_chain(State(node): State<Node>) -> Json<ChainSnapshot> {
    Json(node.get_chain())
}

async fn get_last_block(State(node): State<Node>) -> Result<Json<LastBlockResponse>, ApiError> {
    Ok(Json(LastBlockResponse {
        last_block: node.get_tip()?,
    }))
}

async fn get_mining_context(State(node): State<Node>) -> Result<Json<MiningContext>, ApiError> {
    Ok(Json(node.mining_context()?))
}

async fn get_wallet(State(node): State<Node>, Path(id): Path<String>) -> Json<AccountSummary> {
    Json(node.account_summary(&id))
}
