use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::models::job::JobRow;
use crate::store::EntityStore;

const MAX_CONNECTIONS: u32 = 10;

/// `EntityStore` over the recruitment PostgreSQL schema.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool. Lookups share it for the life of the process.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

/// Identifiers that are not UUIDs cannot match any row.
fn parse_id(kind: &str, id: &str) -> Option<Uuid> {
    match Uuid::parse_str(id.trim()) {
        Ok(uuid) => Some(uuid),
        Err(_) => {
            debug!("Ignoring malformed {kind} id '{id}'");
            None
        }
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find_candidate(&self, id: &str) -> Result<Option<CandidateRow>, AppError> {
        let Some(id) = parse_id("candidate", id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_company(&self, id: &str) -> Result<Option<CompanyRow>, AppError> {
        let Some(id) = parse_id("company", id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn active_jobs(&self, limit: usize) -> Result<Vec<JobRow>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE status = 'active' ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
