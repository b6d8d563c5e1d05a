//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Environment,
    jwt::TokenService,
    repositories::{
        BidRepository, JobRepository, MemoryBidRepository, MemoryJobRepository, PgBidRepository,
        PgJobRepository,
    },
    session::SessionCookies,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub cookies: SessionCookies,
    pub jobs: Arc<dyn JobRepository>,
    pub bids: Arc<dyn BidRepository>,
    /// Present when the repositories are backed by Postgres
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State over explicit repository handles
    pub fn new(
        tokens: TokenService,
        environment: Environment,
        jobs: Arc<dyn JobRepository>,
        bids: Arc<dyn BidRepository>,
    ) -> Self {
        let cookies = SessionCookies::new(environment, tokens.token_expiry());
        Self {
            tokens,
            cookies,
            jobs,
            bids,
            db_pool: None,
        }
    }

    /// State backed by the Postgres collections
    pub fn postgres(tokens: TokenService, environment: Environment, pool: PgPool) -> Self {
        let mut state = Self::new(
            tokens,
            environment,
            Arc::new(PgJobRepository::new(pool.clone())),
            Arc::new(PgBidRepository::new(pool.clone())),
        );
        state.db_pool = Some(pool);
        state
    }

    /// State backed by empty in-memory collections
    pub fn in_memory(tokens: TokenService, environment: Environment) -> Self {
        Self::new(
            tokens,
            environment,
            Arc::new(MemoryJobRepository::new()),
            Arc::new(MemoryBidRepository::new()),
        )
    }
}
