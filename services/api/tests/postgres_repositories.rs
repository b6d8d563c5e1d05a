//! Postgres repository tests
//!
//! These run the JSONB queries against a live server configured through
//! `DATABASE_URL`. They are ignored by default. Every test works on fresh
//! identifiers and emails so reruns against the same database do not collide.

use bidding_api::{
    models::{Bid, Job, JobPatch, NewBid, NewJob, UpdateResult},
    repositories::{BidRepository, JobRepository, PgBidRepository, PgJobRepository, schema},
};
use common::database::{DatabaseConfig, init_pool};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    schema::ensure_collections(&pool).await?;
    Ok(pool)
}

fn unique_email(name: &str) -> String {
    format!("{}-{}@x.com", name, Uuid::new_v4())
}

fn job(owner: &str) -> Job {
    let new_job: NewJob = serde_json::from_value(json!({
        "job_title": "Data entry",
        "category": "Admin",
        "buyer": { "buyer_email": owner, "name": "Owner" }
    }))
    .unwrap();
    Job::from_new(Uuid::new_v4(), new_job)
}

fn bid(bidder: &str, job_id: Uuid, buyer: &str) -> Bid {
    let new_bid: NewBid = serde_json::from_value(json!({
        "job_id": job_id,
        "bidder": { "email": bidder },
        "buyer_email": buyer,
        "price": 120
    }))
    .unwrap();
    Bid::from_new(Uuid::new_v4(), new_bid)
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_jobs_are_stored_and_filtered_by_owner() -> TestResult {
    let pool = pool().await?;
    let repo = PgJobRepository::new(pool.clone());
    let owner = unique_email("owner");
    let other = unique_email("other");

    let posted = job(&owner);
    repo.insert(&posted).await?;
    repo.insert(&job(&other)).await?;
    repo.insert(&job(&owner)).await?;

    let stored = repo.find_by_id(posted.id).await?.expect("job was inserted");
    assert_eq!(stored, posted);
    assert_eq!(repo.find_by_owner(&owner).await?.len(), 2);
    assert!(repo.find_by_id(Uuid::new_v4()).await?.is_none());

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_upsert_creates_missing_job_with_given_id() -> TestResult {
    let pool = pool().await?;
    let repo = PgJobRepository::new(pool.clone());
    let id = Uuid::new_v4();
    let patch: JobPatch = serde_json::from_value(json!({ "job_title": "New", "bid_count": 7 }))?;

    assert_eq!(repo.upsert(id, patch).await?, UpdateResult::upserted(id));

    let stored = repo.find_by_id(id).await?.expect("job was upserted");
    assert_eq!(stored.details["job_title"], "New");
    assert_eq!(stored.bid_count, 0);

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_upsert_merges_into_existing_job() -> TestResult {
    let pool = pool().await?;
    let repo = PgJobRepository::new(pool.clone());
    let existing = job(&unique_email("owner"));
    repo.insert(&existing).await?;
    repo.increment_bid_count(existing.id).await?;

    let patch: JobPatch = serde_json::from_value(json!({ "job_title": "Renamed" }))?;
    assert_eq!(
        repo.upsert(existing.id, patch).await?,
        UpdateResult::updated(1, 1)
    );

    let same: JobPatch = serde_json::from_value(json!({ "job_title": "Renamed" }))?;
    assert_eq!(
        repo.upsert(existing.id, same).await?,
        UpdateResult::updated(1, 0)
    );

    let stored = repo.find_by_id(existing.id).await?.expect("job exists");
    assert_eq!(stored.details["job_title"], "Renamed");
    assert_eq!(stored.details["category"], "Admin");
    assert_eq!(stored.owner_email(), existing.owner_email());
    assert_eq!(stored.bid_count, 1);

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_bid_count_increments_atomically() -> TestResult {
    let pool = pool().await?;
    let repo = PgJobRepository::new(pool.clone());
    let posted = job(&unique_email("owner"));
    repo.insert(&posted).await?;
    let id = posted.id;

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_bid_count(id).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await??, UpdateResult::updated(1, 1));
    }

    let stored = repo.find_by_id(posted.id).await?.expect("job exists");
    assert_eq!(stored.bid_count, 5);

    let missing = repo.increment_bid_count(Uuid::new_v4()).await?;
    assert_eq!(missing.matched_count, 0);

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_delete_reports_deleted_count() -> TestResult {
    let pool = pool().await?;
    let repo = PgJobRepository::new(pool.clone());
    let posted = job(&unique_email("owner"));
    repo.insert(&posted).await?;

    assert_eq!(repo.delete(posted.id).await?.deleted_count, 1);
    assert_eq!(repo.delete(posted.id).await?.deleted_count, 0);
    assert!(repo.find_by_id(posted.id).await?.is_none());

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_second_bid_on_same_job_is_a_duplicate() -> TestResult {
    let pool = pool().await?;
    let repo = PgBidRepository::new(pool.clone());
    let bidder = unique_email("bidder");
    let job_id = Uuid::new_v4();

    repo.insert(&bid(&bidder, job_id, "owner@x.com")).await?;
    let err = repo
        .insert(&bid(&bidder, job_id, "owner@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    let other_job = Uuid::new_v4();
    repo.insert(&bid(&bidder, other_job, "owner@x.com")).await?;
    assert_eq!(repo.find_by_bidder(&bidder).await?.len(), 2);

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_bids_are_found_by_bidder_job_and_buyer() -> TestResult {
    let pool = pool().await?;
    let repo = PgBidRepository::new(pool.clone());
    let bidder = unique_email("bidder");
    let buyer = unique_email("buyer");
    let job_id = Uuid::new_v4();

    let placed = bid(&bidder, job_id, &buyer);
    repo.insert(&placed).await?;

    let found = repo
        .find_by_bidder_and_job(&bidder, job_id)
        .await?
        .expect("bid was inserted");
    assert_eq!(found, placed);
    assert_eq!(found.status, "pending");
    assert!(
        repo.find_by_bidder_and_job(&bidder, Uuid::new_v4())
            .await?
            .is_none()
    );
    assert_eq!(repo.find_by_buyer(&buyer).await?, vec![placed]);

    pool.close().await;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_update_status_reports_modified_count() -> TestResult {
    let pool = pool().await?;
    let repo = PgBidRepository::new(pool.clone());
    let bidder = unique_email("bidder");
    let placed = bid(&bidder, Uuid::new_v4(), "owner@x.com");
    repo.insert(&placed).await?;

    assert_eq!(
        repo.update_status(placed.id, "In Progress").await?,
        UpdateResult::updated(1, 1)
    );
    assert_eq!(
        repo.update_status(placed.id, "In Progress").await?,
        UpdateResult::updated(1, 0)
    );
    assert_eq!(
        repo.update_status(Uuid::new_v4(), "Rejected").await?,
        UpdateResult::updated(0, 0)
    );

    let stored = repo
        .find_by_bidder_and_job(&bidder, placed.job_id)
        .await?
        .expect("bid exists");
    assert_eq!(stored.status, "In Progress");

    pool.close().await;
    Ok(())
}
