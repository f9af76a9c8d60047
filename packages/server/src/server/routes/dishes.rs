use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::common::auth::{CanReadDishes, CanWriteDishes};
use crate::common::filters::Metadata;
use crate::common::DishId;
use crate::domains::dish::{
    create_dish, delete_dish, get_dish, list_dishes, update_dish, Dish, DishInput, DishQuery,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::Permitted;

#[derive(Serialize)]
pub struct DishListResponse {
    pub dishes: Vec<Dish>,
    pub metadata: Metadata,
}

#[derive(Serialize)]
pub struct DishResponse {
    pub dish: Dish,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/v1/dishes?name=&price=&page=&page_size=&sort=
pub async fn list_dishes_handler(
    State(state): State<AppState>,
    _reader: Permitted<CanReadDishes>,
    query: Result<Query<DishQuery>, QueryRejection>,
) -> Result<Json<DishListResponse>, ApiError> {
    let Query(query) = query?;
    let page = list_dishes(&query, &state.deps).await?;
    Ok(Json(DishListResponse {
        dishes: page.records,
        metadata: page.metadata,
    }))
}

/// POST /api/v1/dishes
pub async fn create_dish_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    payload: Result<Json<DishInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DishResponse>), ApiError> {
    let Json(input) = payload?;
    let dish = create_dish(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(DishResponse { dish })))
}

/// GET /api/v1/dishes/:id
pub async fn get_dish_handler(
    State(state): State<AppState>,
    _reader: Permitted<CanReadDishes>,
    id: Result<Path<DishId>, PathRejection>,
) -> Result<Json<DishResponse>, ApiError> {
    let Path(id) = id?;
    let dish = get_dish(id, &state.deps).await?;
    Ok(Json(DishResponse { dish }))
}

/// PUT /api/v1/dishes/:id
pub async fn update_dish_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    id: Result<Path<DishId>, PathRejection>,
    payload: Result<Json<DishInput>, JsonRejection>,
) -> Result<Json<DishResponse>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let dish = update_dish(id, input, &state.deps).await?;
    Ok(Json(DishResponse { dish }))
}

/// DELETE /api/v1/dishes/:id
pub async fn delete_dish_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    id: Result<Path<DishId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    delete_dish(id, &state.deps).await?;
    Ok(Json(MessageResponse {
        message: "Dish deleted successfully",
    }))
}
