//! Job portal bidding marketplace API
//!
//! Clients post jobs, other users bid on them, and job owners review the bid
//! requests they receive. Session identity travels as a signed credential in
//! an HTTP-only cookie.

pub mod bidding;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use config::{ApiConfig, Environment, StorageBackend};
pub use routes::create_router;
pub use state::AppState;
