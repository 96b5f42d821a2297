//! Entity lookups used to enrich prompts.
//!
//! A miss is `Ok(None)`: callers drop that context and carry on. Only
//! infrastructure failures come back as `Err`.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::models::job::JobRow;

/// Read-only view over persisted recruitment entities.
///
/// Carried in `AppState` as `Arc<dyn EntityStore>`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_candidate(&self, id: &str) -> Result<Option<CandidateRow>, AppError>;

    async fn find_company(&self, id: &str) -> Result<Option<CompanyRow>, AppError>;

    /// Active job postings, newest first, at most `limit`.
    async fn active_jobs(&self, limit: usize) -> Result<Vec<JobRow>, AppError>;
}
