//! REST API module
//!
//! Thin HTTP layer over a [`crate::network::Node`].
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /chain` - Full chain and its length
//! - `GET /mine` - Mine a new block
//! - `POST /transactions/new` - Queue a transaction
//! - `POST /nodes/register` - Register peers
//! - `GET /nodes/resolve` - Run consensus against all peers

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
