//! HTTP surface.
//!
//! Exposes the scan workflow and the daily checklists as a JSON API.
//! Routes are nested under `/api/v1` and protected by a bearer-token
//! middleware that resolves the calling user from the database.
//!
//! The router is composable — `api_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::ApiContext;
