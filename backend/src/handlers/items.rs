use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension,
    http::StatusCode,
    Json,
};
use shared::{
    CreateItemRequest, DeleteItemResponse, Item, ListItemsQuery, ListItemsResponse,
    UpdateItemRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::store::{Deadline, ItemChanges, PageRequest};

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Item name must not be empty"));
    }
    Ok(())
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(deadline): Extension<Deadline>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(req) = payload?;
    validate_name(&req.name)?;

    let item = state
        .run(&deadline, move |store, deadline| {
            store.create(&req.name, req.description.as_deref(), deadline)
        })
        .await?;
    tracing::info!(id = %item.id, "created item");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(deadline): Extension<Deadline>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<Json<ListItemsResponse>, ApiError> {
    let Query(query) = query?;
    let request = PageRequest::new(query.limit, query.offset);

    let page = state
        .run(&deadline, move |store, deadline| store.list(request, deadline))
        .await?;

    Ok(Json(ListItemsResponse {
        items: page.items,
        total: page.total,
        limit: page.page.limit,
        offset: page.page.offset,
    }))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(deadline): Extension<Deadline>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Item>, ApiError> {
    let Path(id) = id?;
    let item = state
        .run(&deadline, move |store, deadline| store.get(id, deadline))
        .await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(deadline): Extension<Deadline>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;

    if req.is_empty() {
        return Err(ApiError::validation(
            "At least one of name or description is required",
        ));
    }
    if let Some(name) = &req.name {
        validate_name(name)?;
    }

    let changes = ItemChanges::from(req);
    let item = state
        .run(&deadline, move |store, deadline| {
            store.update(id, &changes, deadline)
        })
        .await?;
    tracing::debug!(id = %item.id, "updated item");

    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(deadline): Extension<Deadline>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    let Path(id) = id?;
    let item = state
        .run(&deadline, move |store, deadline| store.delete(id, deadline))
        .await?;
    tracing::info!(id = %item.id, "deleted item");

    Ok(Json(DeleteItemResponse {
        message: "Item deleted successfully".to_string(),
        item,
    }))
}
