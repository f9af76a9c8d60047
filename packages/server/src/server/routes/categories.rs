use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::auth::{CanReadDishes, CanWriteDishes};
use crate::common::filters::Metadata;
use crate::common::CategoryId;
use crate::domains::category::{
    create_category, delete_category, get_category, list_categories, update_category, Category,
    CategoryChanges, CategoryQuery, NewCategory,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::Permitted;
use crate::server::routes::MessageResponse;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
    pub metadata: Metadata,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// GET /api/v1/categories?name=&page=&page_size=&sort=
pub async fn list_categories_handler(
    State(state): State<AppState>,
    _reader: Permitted<CanReadDishes>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let Query(query) = query?;
    let page = list_categories(&query, &state.deps).await?;
    Ok(Json(CategoryListResponse {
        categories: page.records,
        metadata: page.metadata,
    }))
}

/// POST /api/v1/categories
pub async fn create_category_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let Json(request) = payload?;
    let category = create_category(
        NewCategory {
            name: request.name,
            description: request.description,
        },
        &state.deps,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

/// GET /api/v1/categories/:id
pub async fn get_category_handler(
    State(state): State<AppState>,
    _reader: Permitted<CanReadDishes>,
    id: Result<Path<CategoryId>, PathRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Path(id) = id?;
    let category = get_category(id, &state.deps).await?;
    Ok(Json(CategoryResponse { category }))
}

/// PUT /api/v1/categories/:id
pub async fn update_category_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    id: Result<Path<CategoryId>, PathRejection>,
    payload: Result<Json<CategoryChanges>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    let category = update_category(id, changes, &state.deps).await?;
    Ok(Json(CategoryResponse { category }))
}

/// DELETE /api/v1/categories/:id
pub async fn delete_category_handler(
    State(state): State<AppState>,
    _writer: Permitted<CanWriteDishes>,
    id: Result<Path<CategoryId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    delete_category(id, &state.deps).await?;
    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}
