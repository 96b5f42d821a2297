use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub skills: Vec<String>,
    /// Free-form JSONB as captured by the recruiter UI.
    pub experience: Option<Value>,
    pub education: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl CandidateRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
