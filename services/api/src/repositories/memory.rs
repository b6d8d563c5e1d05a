//! In-memory repositories
//!
//! Used when `STORAGE_BACKEND=memory` and by the test suites. They follow the
//! Postgres backend's rules, including the one-bid-per-bidder-per-job
//! uniqueness check, which is made under the collection's write lock.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use common::error::{DatabaseError, DatabaseResult};

use super::{BidRepository, JobRepository};
use crate::models::{
    Bid, DeleteResult, InsertResult, Job, JobPatch, UpdateResult, job::merge_fields,
};

/// Job collection held in process memory
#[derive(Default)]
pub struct MemoryJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn list_all(&self) -> DatabaseResult<Vec<Job>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Job>> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn find_by_owner(&self, email: &str) -> DatabaseResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .filter(|j| j.owner_email() == email)
            .cloned()
            .collect())
    }

    async fn insert(&self, job: &Job) -> DatabaseResult<InsertResult> {
        let mut jobs = self.jobs.write().await;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(DatabaseError::Duplicate(format!("jobs._id {}", job.id)));
        }
        jobs.push(job.clone());
        Ok(InsertResult::new(job.id))
    }

    async fn upsert(&self, id: Uuid, patch: JobPatch) -> DatabaseResult<UpdateResult> {
        let patch = patch.into_document()?;
        let mut jobs = self.jobs.write().await;

        match jobs.iter().position(|j| j.id == id) {
            Some(index) => {
                let mut doc = jobs[index].to_document()?;
                let modified = merge_fields(&mut doc, patch);
                if modified {
                    jobs[index] = Job::from_document(id, doc)?;
                }
                Ok(UpdateResult::updated(1, u64::from(modified)))
            }
            None => {
                jobs.push(Job::from_document(id, patch)?);
                Ok(UpdateResult::upserted(id))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<DeleteResult> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(DeleteResult::new((before - jobs.len()) as u64))
    }

    async fn increment_bid_count(&self, id: Uuid) -> DatabaseResult<UpdateResult> {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.bid_count += 1;
                Ok(UpdateResult::updated(1, 1))
            }
            None => Ok(UpdateResult::updated(0, 0)),
        }
    }
}

/// Bid collection held in process memory
#[derive(Default)]
pub struct MemoryBidRepository {
    bids: RwLock<Vec<Bid>>,
}

impl MemoryBidRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bids
    pub async fn len(&self) -> usize {
        self.bids.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bids.read().await.is_empty()
    }
}

#[async_trait]
impl BidRepository for MemoryBidRepository {
    async fn find_by_bidder_and_job(
        &self,
        bidder_email: &str,
        job_id: Uuid,
    ) -> DatabaseResult<Option<Bid>> {
        Ok(self
            .bids
            .read()
            .await
            .iter()
            .find(|b| b.bidder_email() == bidder_email && b.job_id == job_id)
            .cloned())
    }

    async fn find_by_bidder(&self, email: &str) -> DatabaseResult<Vec<Bid>> {
        Ok(self
            .bids
            .read()
            .await
            .iter()
            .filter(|b| b.bidder_email() == email)
            .cloned()
            .collect())
    }

    async fn find_by_buyer(&self, email: &str) -> DatabaseResult<Vec<Bid>> {
        Ok(self
            .bids
            .read()
            .await
            .iter()
            .filter(|b| b.buyer_email == email)
            .cloned()
            .collect())
    }

    async fn insert(&self, bid: &Bid) -> DatabaseResult<InsertResult> {
        let mut bids = self.bids.write().await;
        if bids
            .iter()
            .any(|b| b.bidder_email() == bid.bidder_email() && b.job_id == bid.job_id)
        {
            return Err(DatabaseError::Duplicate(format!(
                "bids (bidder_email, job_id) = ({}, {})",
                bid.bidder_email(),
                bid.job_id
            )));
        }
        bids.push(bid.clone());
        Ok(InsertResult::new(bid.id))
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DatabaseResult<UpdateResult> {
        let mut bids = self.bids.write().await;
        match bids.iter_mut().find(|b| b.id == id) {
            Some(bid) => {
                let modified = bid.status != status;
                bid.status = status.to_string();
                Ok(UpdateResult::updated(1, u64::from(modified)))
            }
            None => Ok(UpdateResult::updated(0, 0)),
        }
    }
}
