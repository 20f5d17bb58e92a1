//! REST API handlers for ledger operations

use crate::core::{Block, ChainSnapshot, Transaction};
use crate::network::{Node, NodeError};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub node: Arc<Node>,
}

impl ApiState {
    pub fn new(node: Arc<Node>) -> Self {
        Self { node }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolveResponse {
    Replaced {
        message: String,
        new_chain: Vec<Block>,
    },
    Authoritative {
        message: String,
        chain: Vec<Block>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.into(),
        }),
    )
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /chain - Full chain and its length
pub async fn full_chain(State(state): State<ApiState>) -> Json<ChainSnapshot> {
    Json(state.node.get_chain().await)
}

/// POST /transactions/new - Queue a transaction
pub async fn new_transaction(
    State(state): State<ApiState>,
    payload: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(req) = payload.map_err(|e| {
        log::debug!("Rejected transaction: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Missing values")
    })?;

    let index = state
        .node
        .submit_transaction(&req.sender, &req.recipient, req.amount)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {}", index),
        }),
    ))
}

/// GET /mine - Mine a new block
pub async fn mine(State(state): State<ApiState>) -> ApiResult<MineResponse> {
    match state.node.mine().await {
        Ok((block, _stats)) => Ok((
            StatusCode::OK,
            Json(MineResponse {
                message: "New Block Forged".to_string(),
                index: block.index,
                transactions: block.transactions,
                proof: block.proof,
                previous_hash: block.previous_hash,
            }),
        )),
        Err(NodeError::ShuttingDown) => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Node is shutting down",
        )),
        Err(e) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Mining failed: {}", e),
        )),
    }
}

/// POST /nodes/register - Register peers
pub async fn register_nodes(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let nodes = match payload {
        Ok(Json(RegisterNodesRequest { nodes: Some(nodes) })) => nodes,
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Error: Please supply a valid list of nodes",
            ))
        }
    };

    state
        .node
        .register_peers(&nodes)
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added".to_string(),
            total_nodes: state.node.peers().await,
        }),
    ))
}

/// GET /nodes/resolve - Run consensus against all known peers
pub async fn consensus(State(state): State<ApiState>) -> Json<ResolveResponse> {
    let (replaced, snapshot) = state.node.run_consensus().await;

    Json(if replaced {
        ResolveResponse::Replaced {
            message: "Our chain was replaced".to_string(),
            new_chain: snapshot.chain,
        }
    } else {
        ResolveResponse::Authoritative {
            message: "Our chain is authoritative".to_string(),
            chain: snapshot.chain,
        }
    })
}

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}
