//! Collection bootstrap for the Postgres backend
//!
//! Every statement is idempotent and runs at startup, creating the two
//! document collections on a fresh database the same way a document store
//! creates them on first write.

use sqlx::PgPool;
use tracing::info;

use common::error::{DatabaseError, DatabaseResult};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id UUID PRIMARY KEY,
        doc JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS jobs_buyer_email_idx
        ON jobs ((doc -> 'buyer' ->> 'buyer_email'))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bids (
        id UUID PRIMARY KEY,
        job_id UUID NOT NULL,
        bidder_email TEXT NOT NULL,
        buyer_email TEXT NOT NULL DEFAULT '',
        doc JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS bids_bidder_job_idx
        ON bids (bidder_email, job_id)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS bids_buyer_email_idx
        ON bids (buyer_email)
    "#,
];

/// Create the job and bid collections if they do not exist yet
pub async fn ensure_collections(pool: &PgPool) -> DatabaseResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Schema(e.to_string()))?;
    }

    info!("Job and bid collections are ready");
    Ok(())
}
