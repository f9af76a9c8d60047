use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::CategoryId;

pub const MAX_CATEGORY_NAME_BYTES: usize = 100;

/// Dish category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}
