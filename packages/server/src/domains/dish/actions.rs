//! Dish actions - menu CRUD, listed through the shared filter engine

use serde::Deserialize;
use tracing::info;

use crate::common::filters::{Filters, ListParams, Page, SortSafelist};
use crate::common::validation::ValidationErrors;
use crate::common::DishId;
use crate::domains::dish::models::{
    Dish, DishFilter, NewDish, MAX_DISH_DESCRIPTION_BYTES, MAX_DISH_NAME_BYTES,
};
use crate::kernel::{ServerDeps, StoreError};

/// Sortable columns for `GET /dishes`; `id` ascending when unspecified.
pub static DISH_SORT_SAFELIST: SortSafelist = SortSafelist::new(
    &["id", "name", "price", "-id", "-name", "-price"],
    "id",
);

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DishQuery {
    #[serde(default)]
    pub name: String,
    /// Minimum price; kept as text so a bad value becomes a field error.
    #[serde(default)]
    pub price: String,
    #[serde(flatten)]
    pub list: ListParams,
}

/// Body of create and update. On update, `None` keeps the stored value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DishInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DishError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("dish not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for DishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DishError::NotFound,
            other => DishError::Store(other),
        }
    }
}

fn parse_min_price(v: &mut ValidationErrors, raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
        _ => {
            v.add("price", "must be a non-negative number");
            None
        }
    }
}

fn validate_dish(v: &mut ValidationErrors, dish: &NewDish) {
    v.check(!dish.name.is_empty(), "name", "must be provided");
    v.check(
        dish.name.len() <= MAX_DISH_NAME_BYTES,
        "name",
        "must not be more than 100 bytes long",
    );
    v.check(
        dish.description.len() <= MAX_DISH_DESCRIPTION_BYTES,
        "description",
        "must not be more than 1000 bytes long",
    );
    v.check(
        dish.price.is_finite() && dish.price >= 0.0,
        "price",
        "must be a non-negative number",
    );
}

pub async fn list_dishes(query: &DishQuery, deps: &ServerDeps) -> Result<Page<Dish>, DishError> {
    let mut v = ValidationErrors::new();
    let min_price = parse_min_price(&mut v, &query.price);
    let filters = match Filters::parse(&query.list, &DISH_SORT_SAFELIST) {
        Ok(filters) => filters,
        Err(errors) => {
            v.merge(errors);
            return Err(v.into());
        }
    };
    v.into_result()?;

    let filter = DishFilter {
        name: query.name.trim().to_string(),
        min_price,
    };
    Ok(deps.dishes.list(&filter, &filters).await?)
}

pub async fn get_dish(id: DishId, deps: &ServerDeps) -> Result<Dish, DishError> {
    Ok(deps.dishes.find(id).await?)
}

pub async fn create_dish(input: DishInput, deps: &ServerDeps) -> Result<Dish, DishError> {
    let mut v = ValidationErrors::new();
    v.check(input.price.is_some(), "price", "must be provided");
    let dish = NewDish {
        name: input.name.unwrap_or_default().trim().to_string(),
        description: input.description.unwrap_or_default(),
        price: input.price.unwrap_or_default(),
    };
    validate_dish(&mut v, &dish);
    v.into_result()?;

    let dish = deps.dishes.insert(dish).await?;
    info!(dish_id = %dish.id, "dish created");
    Ok(dish)
}

pub async fn update_dish(
    id: DishId,
    input: DishInput,
    deps: &ServerDeps,
) -> Result<Dish, DishError> {
    let mut dish = deps.dishes.find(id).await?;
    if let Some(name) = input.name {
        dish.name = name.trim().to_string();
    }
    if let Some(description) = input.description {
        dish.description = description;
    }
    if let Some(price) = input.price {
        dish.price = price;
    }

    let mut v = ValidationErrors::new();
    validate_dish(
        &mut v,
        &NewDish {
            name: dish.name.clone(),
            description: dish.description.clone(),
            price: dish.price,
        },
    );
    v.into_result()?;

    deps.dishes.update(&mut dish).await?;
    info!(dish_id = %dish.id, "dish updated");
    Ok(dish)
}

pub async fn delete_dish(id: DishId, deps: &ServerDeps) -> Result<(), DishError> {
    deps.dishes.delete(id).await?;
    info!(dish_id = %id, "dish deleted");
    Ok(())
}
