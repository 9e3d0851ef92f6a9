//! HTTP API.
//!
//! Routes are nested under `/api/`; see `router` for the layout and the
//! authentication rules per route.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, IntakeServer};
pub use types::ApiContext;
