//! Repositories for job and bid persistence
//!
//! Handlers talk to the store through the [`JobRepository`] and
//! [`BidRepository`] traits. The Postgres implementations keep each entity
//! as a JSONB document; the in-memory ones back local development and tests.

use async_trait::async_trait;
use uuid::Uuid;

use common::error::DatabaseResult;

use crate::models::{Bid, DeleteResult, InsertResult, Job, JobPatch, UpdateResult};

pub mod bid;
pub mod job;
pub mod memory;
pub mod schema;

pub use bid::PgBidRepository;
pub use job::PgJobRepository;
pub use memory::{MemoryBidRepository, MemoryJobRepository};

/// Job persistence
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All jobs, oldest first
    async fn list_all(&self) -> DatabaseResult<Vec<Job>>;

    /// A single job by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Job>>;

    /// Jobs posted by the given owner email
    async fn find_by_owner(&self, email: &str) -> DatabaseResult<Vec<Job>>;

    /// Persist a new job
    async fn insert(&self, job: &Job) -> DatabaseResult<InsertResult>;

    /// Set the patch's fields on the job, creating it with this ID if absent
    async fn upsert(&self, id: Uuid, patch: JobPatch) -> DatabaseResult<UpdateResult>;

    /// Delete a job by ID
    async fn delete(&self, id: Uuid) -> DatabaseResult<DeleteResult>;

    /// Atomically add one to the job's bid counter
    async fn increment_bid_count(&self, id: Uuid) -> DatabaseResult<UpdateResult>;
}

/// Bid persistence
#[async_trait]
pub trait BidRepository: Send + Sync {
    /// The bid a bidder placed on a job, if any
    async fn find_by_bidder_and_job(
        &self,
        bidder_email: &str,
        job_id: Uuid,
    ) -> DatabaseResult<Option<Bid>>;

    /// Bids placed by the given bidder email
    async fn find_by_bidder(&self, email: &str) -> DatabaseResult<Vec<Bid>>;

    /// Bids received on jobs owned by the given email
    async fn find_by_buyer(&self, email: &str) -> DatabaseResult<Vec<Bid>>;

    /// Persist a new bid. Fails with `DatabaseError::Duplicate` when the
    /// bidder already has a bid on the job.
    async fn insert(&self, bid: &Bid) -> DatabaseResult<InsertResult>;

    /// Set a bid's status
    async fn update_status(&self, id: Uuid, status: &str) -> DatabaseResult<UpdateResult>;
}
