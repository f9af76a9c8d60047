use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::DishId;

pub const MAX_DISH_NAME_BYTES: usize = 100;
pub const MAX_DISH_DESCRIPTION_BYTES: usize = 1_000;

/// Menu item
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Dish {
    pub id: DishId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Row selection for the dish list, applied before sorting and paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DishFilter {
    /// Exact name, compared case-insensitively. Empty matches every dish.
    pub name: String,
    /// Lower price bound, inclusive.
    pub min_price: Option<f64>,
}

impl DishFilter {
    pub fn matches(&self, dish: &Dish) -> bool {
        let name_ok = self.name.is_empty() || dish.name.to_lowercase() == self.name.to_lowercase();
        let price_ok = self.min_price.map_or(true, |min| dish.price >= min);
        name_ok && price_ok
    }
}
