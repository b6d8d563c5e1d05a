//! Bid placement
//!
//! Placing a bid touches both collections without a transaction:
//!
//! 1. look for an existing bid by the same bidder on the same job,
//! 2. insert the new bid,
//! 3. increment the job's `bid_count`.
//!
//! The store's uniqueness rule on `(bidder email, job_id)` backs up step 1,
//! so two concurrent placements still leave one bid and one increment. A
//! failure in step 3 leaves the bid stored with the counter one short.

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::error::DatabaseError;

use crate::{
    models::{Bid, InsertResult, NewBid},
    repositories::{BidRepository, JobRepository},
};

/// Bid placement errors
#[derive(Error, Debug)]
pub enum BidError {
    /// The bidder already has a bid on this job
    #[error("You have already placed a bid on this job")]
    Duplicate,

    /// A required field is missing
    #[error("{0}")]
    Missing(&'static str),

    /// Store failure
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for BidError {
    fn from(err: DatabaseError) -> Self {
        if err.is_duplicate() {
            BidError::Duplicate
        } else {
            BidError::Database(err)
        }
    }
}

/// Place a bid and bump the job's bid counter
pub async fn place_bid(
    jobs: &dyn JobRepository,
    bids: &dyn BidRepository,
    new_bid: NewBid,
) -> Result<InsertResult, BidError> {
    if new_bid.bidder.email.trim().is_empty() {
        return Err(BidError::Missing("bidder email is required"));
    }

    let bid = Bid::from_new(Uuid::new_v4(), new_bid);

    if bids
        .find_by_bidder_and_job(bid.bidder_email(), bid.job_id)
        .await?
        .is_some()
    {
        info!(
            "{} already placed a bid on job {}",
            bid.bidder_email(),
            bid.job_id
        );
        return Err(BidError::Duplicate);
    }

    let result = bids.insert(&bid).await?;

    match jobs.increment_bid_count(bid.job_id).await {
        Ok(update) if update.matched_count == 0 => {
            warn!("Bid {} references missing job {}", bid.id, bid.job_id);
        }
        Ok(_) => {}
        Err(e) => {
            error!(
                "Bid {} stored but bid_count of job {} was not incremented: {}",
                bid.id, bid.job_id, e
            );
            return Err(BidError::Database(e));
        }
    }

    info!("Bid {} placed on job {}", bid.id, bid.job_id);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{DeleteResult, Job, JobPatch, NewJob, UpdateResult},
        repositories::{MemoryBidRepository, MemoryJobRepository},
    };
    use async_trait::async_trait;
    use common::error::DatabaseResult;
    use serde_json::json;
    use std::sync::Arc;

    async fn posted_job(jobs: &MemoryJobRepository) -> Uuid {
        let new_job: NewJob = serde_json::from_value(json!({
            "job_title": "Write docs",
            "buyer": { "buyer_email": "owner@x.com" }
        }))
        .unwrap();
        let job = Job::from_new(Uuid::new_v4(), new_job);
        jobs.insert(&job).await.unwrap();
        job.id
    }

    fn new_bid(bidder: &str, job_id: Uuid) -> NewBid {
        serde_json::from_value(json!({
            "job_id": job_id,
            "bidder": { "email": bidder },
            "buyer_email": "owner@x.com",
            "price": 200
        }))
        .unwrap()
    }

    async fn bid_count(jobs: &MemoryJobRepository, id: Uuid) -> i64 {
        jobs.find_by_id(id).await.unwrap().unwrap().bid_count
    }

    #[tokio::test]
    async fn test_first_bid_is_stored_and_counted_once() {
        let jobs = MemoryJobRepository::new();
        let bids = MemoryBidRepository::new();
        let job_id = posted_job(&jobs).await;

        let result = place_bid(&jobs, &bids, new_bid("a@x.com", job_id))
            .await
            .unwrap();

        assert!(result.acknowledged);
        assert_eq!(bids.len().await, 1);
        assert_eq!(bid_count(&jobs, job_id).await, 1);
    }

    #[tokio::test]
    async fn test_second_bid_is_rejected_and_changes_nothing() {
        let jobs = MemoryJobRepository::new();
        let bids = MemoryBidRepository::new();
        let job_id = posted_job(&jobs).await;

        place_bid(&jobs, &bids, new_bid("a@x.com", job_id))
            .await
            .unwrap();
        let err = place_bid(&jobs, &bids, new_bid("a@x.com", job_id))
            .await
            .unwrap_err();

        assert!(matches!(err, BidError::Duplicate));
        assert_eq!(bids.len().await, 1);
        assert_eq!(bid_count(&jobs, job_id).await, 1);
    }

    #[tokio::test]
    async fn test_other_bidders_are_counted_separately() {
        let jobs = MemoryJobRepository::new();
        let bids = MemoryBidRepository::new();
        let job_id = posted_job(&jobs).await;

        place_bid(&jobs, &bids, new_bid("a@x.com", job_id))
            .await
            .unwrap();
        place_bid(&jobs, &bids, new_bid("b@x.com", job_id))
            .await
            .unwrap();

        assert_eq!(bids.len().await, 2);
        assert_eq!(bid_count(&jobs, job_id).await, 2);
    }

    #[tokio::test]
    async fn test_missing_bidder_email_is_rejected_before_any_write() {
        let jobs = MemoryJobRepository::new();
        let bids = MemoryBidRepository::new();
        let job_id = posted_job(&jobs).await;

        let err = place_bid(&jobs, &bids, new_bid("  ", job_id))
            .await
            .unwrap_err();

        assert!(matches!(err, BidError::Missing(_)));
        assert!(bids.is_empty().await);
        assert_eq!(bid_count(&jobs, job_id).await, 0);
    }

    #[tokio::test]
    async fn test_bid_on_unknown_job_is_kept() {
        let jobs = MemoryJobRepository::new();
        let bids = MemoryBidRepository::new();

        place_bid(&jobs, &bids, new_bid("a@x.com", Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(bids.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_placements_store_one_bid() {
        let jobs = Arc::new(MemoryJobRepository::new());
        let bids = Arc::new(MemoryBidRepository::new());
        let job_id = posted_job(&jobs).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let jobs = Arc::clone(&jobs);
                let bids = Arc::clone(&bids);
                tokio::spawn(async move {
                    place_bid(jobs.as_ref(), bids.as_ref(), new_bid("a@x.com", job_id)).await
                })
            })
            .collect();

        let mut placed = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => placed += 1,
                Err(BidError::Duplicate) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(placed, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(bids.len().await, 1);
        assert_eq!(bid_count(&jobs, job_id).await, 1);
    }

    /// Job store whose counter update always fails
    struct FailingCounter;

    #[async_trait]
    impl JobRepository for FailingCounter {
        async fn list_all(&self) -> DatabaseResult<Vec<Job>> {
            Ok(vec![])
        }
        async fn find_by_id(&self, _id: Uuid) -> DatabaseResult<Option<Job>> {
            Ok(None)
        }
        async fn find_by_owner(&self, _email: &str) -> DatabaseResult<Vec<Job>> {
            Ok(vec![])
        }
        async fn insert(&self, job: &Job) -> DatabaseResult<InsertResult> {
            Ok(InsertResult::new(job.id))
        }
        async fn upsert(&self, id: Uuid, _patch: JobPatch) -> DatabaseResult<UpdateResult> {
            Ok(UpdateResult::upserted(id))
        }
        async fn delete(&self, _id: Uuid) -> DatabaseResult<DeleteResult> {
            Ok(DeleteResult::new(0))
        }
        async fn increment_bid_count(&self, _id: Uuid) -> DatabaseResult<UpdateResult> {
            Err(DatabaseError::Configuration("connection lost".to_string()))
        }
    }

    #[tokio::test]
    async fn test_counter_failure_after_insert_keeps_the_bid() {
        let bids = MemoryBidRepository::new();

        let err = place_bid(&FailingCounter, &bids, new_bid("a@x.com", Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, BidError::Database(_)));
        assert_eq!(bids.len().await, 1);
    }
}
