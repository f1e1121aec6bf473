use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::cqrs::{
    CommandHandler, CreateClassCommand, CreateClassHandler, DeleteClassCommand, DeleteClassHandler,
    GetClassesHandler, GetClassesQuery, QueryHandler, UpdateClassCommand, UpdateClassHandler,
};
use crate::error::ApiResult;
use crate::models::{Class, CreateClassRequest};
use crate::patch::{apply_patch, PatchDocument};

use super::utils::{
    empty_as_none, load_class, require_body, require_patch, require_query, JsonBody, QueryParams,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListClassesParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub semester: Option<i32>,
    #[serde(alias = "courseId")]
    pub course_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub size: Option<i64>,
}

/// GET /api/v1/classes - Filtered, paginated listing
pub async fn list(
    State(state): State<AppState>,
    query: QueryParams<ListClassesParams>,
) -> ApiResult<Json<Vec<Class>>> {
    let params = require_query(query)?;
    let query = GetClassesQuery::new(
        params.year,
        params.semester,
        params.course_id,
        params.page,
        params.size,
    );
    let classes = GetClassesHandler::new(state.repository.clone())
        .handle(query)
        .await?;
    Ok(Json(classes))
}

/// POST /api/v1/classes - Create a class with optional embedded children
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<CreateClassRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = require_body(body)?;

    let class = CreateClassHandler::new(state.repository.clone())
        .handle(CreateClassCommand {
            class: request.into_class(),
        })
        .await?;

    let location = format!("/api/v1/classes/{}", class.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(class)))
}

/// GET /api/v1/classes/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Class>> {
    Ok(Json(load_class(&state, &id).await?))
}

/// PUT /api/v1/classes/:id - Full replacement; the path id wins over the body
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<Class>,
) -> ApiResult<Json<Class>> {
    let class = require_body(body)?;

    let stored = UpdateClassHandler::new(state.repository.clone())
        .handle(UpdateClassCommand { id, class })
        .await?;
    Ok(Json(stored))
}

/// PATCH /api/v1/classes/:id - Apply a field map to the stored class
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<PatchDocument>,
) -> ApiResult<Json<Class>> {
    let updates = require_patch(body)?;
    let mut class = load_class(&state, &id).await?;

    apply_patch(&mut class, &updates);

    let stored = UpdateClassHandler::new(state.repository.clone())
        .handle(UpdateClassCommand { id, class })
        .await?;
    Ok(Json(stored))
}

/// DELETE /api/v1/classes/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    DeleteClassHandler::new(state.repository.clone())
        .handle(DeleteClassCommand { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
