//! Postgres job repository

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use common::error::{DatabaseError, DatabaseResult};

use super::JobRepository;
use crate::models::{
    DeleteResult, Document, InsertResult, Job, JobPatch, UpdateResult, job::merge_fields,
};

/// Job repository backed by the `jobs` table
#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    /// Create a new job repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: &PgRow) -> DatabaseResult<Job> {
    let id: Uuid = row.try_get("id").map_err(DatabaseError::Query)?;
    let Json(doc): Json<Document> = row.try_get("doc").map_err(DatabaseError::Query)?;
    Job::from_document(id, doc)
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn list_all(&self) -> DatabaseResult<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT id, doc
            FROM jobs
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(job_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Job>> {
        let row = sqlx::query(
            r#"
            SELECT id, doc
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn find_by_owner(&self, email: &str) -> DatabaseResult<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT id, doc
            FROM jobs
            WHERE doc -> 'buyer' ->> 'buyer_email' = $1
            ORDER BY created_at
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(job_from_row).collect()
    }

    async fn insert(&self, job: &Job) -> DatabaseResult<InsertResult> {
        info!("Inserting job {}", job.id);

        sqlx::query(
            r#"
            INSERT INTO jobs (id, doc)
            VALUES ($1, $2)
            "#,
        )
        .bind(job.id)
        .bind(Json(job.to_document()?))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(InsertResult::new(job.id))
    }

    async fn upsert(&self, id: Uuid, patch: JobPatch) -> DatabaseResult<UpdateResult> {
        let patch = patch.into_document()?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let existing = sqlx::query(
            r#"
            SELECT doc
            FROM jobs
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let result = match existing {
            Some(row) => {
                let Json(mut doc): Json<Document> =
                    row.try_get("doc").map_err(DatabaseError::Query)?;
                let modified = merge_fields(&mut doc, patch);

                if modified {
                    sqlx::query("UPDATE jobs SET doc = $2 WHERE id = $1")
                        .bind(id)
                        .bind(Json(&doc))
                        .execute(&mut *tx)
                        .await
                        .map_err(DatabaseError::Query)?;
                }

                UpdateResult::updated(1, u64::from(modified))
            }
            None => {
                info!("Job {} not found, inserting it", id);

                // a concurrent upsert may have created the row since the select
                sqlx::query(
                    r#"
                    INSERT INTO jobs (id, doc)
                    VALUES ($1, $2)
                    ON CONFLICT (id) DO UPDATE SET doc = jobs.doc || EXCLUDED.doc
                    "#,
                )
                .bind(id)
                .bind(Json(&patch))
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;

                UpdateResult::upserted(id)
            }
        };

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn increment_bid_count(&self, id: Uuid) -> DatabaseResult<UpdateResult> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET doc = jsonb_set(
                doc,
                '{bid_count}',
                to_jsonb(COALESCE((doc ->> 'bid_count')::bigint, 0) + 1)
            )
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let affected = result.rows_affected();
        Ok(UpdateResult::updated(affected, affected))
    }
}
