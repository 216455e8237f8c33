/*
 * Provider registry data model: the catalog of upstream content sources this service federates.
 * I'm keeping this a thin row type — adapter behavior lives in services::providers, not here.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub feed_url: String,
    pub format_tag: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn is_active(&self) -> bool {
        self.active
    }
}
