use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
}
