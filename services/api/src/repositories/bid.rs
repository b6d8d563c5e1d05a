//! Postgres bid repository

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use common::error::{DatabaseError, DatabaseResult};

use super::BidRepository;
use crate::models::{Bid, Document, InsertResult, UpdateResult};

/// Bid repository backed by the `bids` table
///
/// The bidder email, job ID and buyer email are copied out of the document
/// into columns so that `(bidder_email, job_id)` can carry a unique index.
#[derive(Clone)]
pub struct PgBidRepository {
    pool: PgPool,
}

impl PgBidRepository {
    /// Create a new bid repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_email(&self, query: &'static str, email: &str) -> DatabaseResult<Vec<Bid>> {
        let rows = sqlx::query(query)
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.iter().map(bid_from_row).collect()
    }
}

fn bid_from_row(row: &PgRow) -> DatabaseResult<Bid> {
    let id: Uuid = row.try_get("id").map_err(DatabaseError::Query)?;
    let Json(doc): Json<Document> = row.try_get("doc").map_err(DatabaseError::Query)?;
    Bid::from_document(id, doc)
}

#[async_trait]
impl BidRepository for PgBidRepository {
    async fn find_by_bidder_and_job(
        &self,
        bidder_email: &str,
        job_id: Uuid,
    ) -> DatabaseResult<Option<Bid>> {
        let row = sqlx::query(
            r#"
            SELECT id, doc
            FROM bids
            WHERE bidder_email = $1 AND job_id = $2
            "#,
        )
        .bind(bidder_email)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(bid_from_row).transpose()
    }

    async fn find_by_bidder(&self, email: &str) -> DatabaseResult<Vec<Bid>> {
        self.fetch_by_email(
            r#"
            SELECT id, doc
            FROM bids
            WHERE bidder_email = $1
            ORDER BY created_at
            "#,
            email,
        )
        .await
    }

    async fn find_by_buyer(&self, email: &str) -> DatabaseResult<Vec<Bid>> {
        self.fetch_by_email(
            r#"
            SELECT id, doc
            FROM bids
            WHERE buyer_email = $1
            ORDER BY created_at
            "#,
            email,
        )
        .await
    }

    async fn insert(&self, bid: &Bid) -> DatabaseResult<InsertResult> {
        info!("Inserting bid {} on job {}", bid.id, bid.job_id);

        sqlx::query(
            r#"
            INSERT INTO bids (id, job_id, bidder_email, buyer_email, doc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bid.id)
        .bind(bid.job_id)
        .bind(bid.bidder_email())
        .bind(&bid.buyer_email)
        .bind(Json(bid.to_document()?))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(InsertResult::new(bid.id))
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DatabaseResult<UpdateResult> {
        let modified: Option<bool> = sqlx::query_scalar(
            r#"
            WITH target AS (
                SELECT id, doc ->> 'status' AS old_status
                FROM bids
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE bids
            SET doc = jsonb_set(bids.doc, '{status}', to_jsonb($2::text))
            FROM target
            WHERE bids.id = target.id
            RETURNING target.old_status IS DISTINCT FROM $2::text
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(match modified {
            Some(modified) => UpdateResult::updated(1, u64::from(modified)),
            None => UpdateResult::updated(0, 0),
        })
    }
}
