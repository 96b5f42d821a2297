//! In-memory `EntityStore` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::models::job::JobRow;
use crate::store::EntityStore;

#[derive(Default)]
pub struct MemoryStore {
    pub candidates: HashMap<String, CandidateRow>,
    pub companies: HashMap<String, CompanyRow>,
    pub jobs: Vec<JobRow>,
    /// Simulates the database being unreachable.
    pub unavailable: bool,
    pub lookups: AtomicUsize,
}

impl MemoryStore {
    fn check(&self) -> Result<(), AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_candidate(&self, id: &str) -> Result<Option<CandidateRow>, AppError> {
        self.check()?;
        Ok(self.candidates.get(id).cloned())
    }

    async fn find_company(&self, id: &str) -> Result<Option<CompanyRow>, AppError> {
        self.check()?;
        Ok(self.companies.get(id).cloned())
    }

    async fn active_jobs(&self, limit: usize) -> Result<Vec<JobRow>, AppError> {
        self.check()?;
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.status == "active")
            .take(limit)
            .cloned()
            .collect())
    }
}
