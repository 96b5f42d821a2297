use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub requirements: Option<String>,
    pub description: Option<String>,
    /// `active` | `draft` | `closed`
    pub status: String,
    pub created_at: DateTime<Utc>,
}
