//! Defines the JSON endpoints for category and subcategory CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    auth::Claims,
    category::core::{
        Category, CategoryId, CategoryKind, Subcategory, SubcategoryId, create_category,
        create_subcategory, delete_category, delete_subcategory, get_categories, update_category,
    },
};

/// The expected fields for creating or updating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryData {
    /// The display name of the category.
    pub name: String,
    /// Whether the category groups income or expenses.
    pub kind: CategoryKind,
}

/// The expected fields for creating a subcategory.
#[derive(Debug, Deserialize)]
pub struct SubcategoryData {
    /// The display name of the subcategory.
    pub name: String,
}

/// A route handler for listing the caller's categories with their
/// subcategories.
pub async fn get_categories_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_categories(claims.user_id, &connection).map(Json)
}

/// A route handler for creating a category, responds with 201 CREATED.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<CategoryData>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(claims.user_id, &data.name, data.kind, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for updating a category's name and kind.
pub async fn update_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<CategoryId>,
    Json(data): Json<CategoryData>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_category(category_id, claims.user_id, &data.name, data.kind, &connection).map(Json)
}

/// A route handler for deleting a category and its subcategories.
///
/// Deletion is refused with 400 BAD REQUEST while any transaction still
/// references the category.
pub async fn delete_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<CategoryId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_category(category_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

/// A route handler for creating a subcategory under one of the caller's
/// categories, responds with 201 CREATED.
pub async fn create_subcategory_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<CategoryId>,
    Json(data): Json<SubcategoryData>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let subcategory = create_subcategory(category_id, claims.user_id, &data.name, &connection)?;

    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// A route handler for deleting a subcategory.
pub async fn delete_subcategory_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(subcategory_id): Path<SubcategoryId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_subcategory(subcategory_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Subcategory deleted successfully" })))
}
