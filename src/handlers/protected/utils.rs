use std::fmt::Display;
use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};
use serde::{de, Deserialize, Deserializer};

use crate::app::AppState;
use crate::cqrs::{GetClassByIdHandler, GetClassByIdQuery, QueryHandler};
use crate::error::{ApiError, ApiResult};
use crate::models::Class;
use crate::patch::PatchDocument;

/// Body extractor result for endpoints where an absent, `null` or unparsable
/// body is a 400.
pub type JsonBody<T> = Result<Json<Option<T>>, JsonRejection>;

pub fn require_body<T>(body: JsonBody<T>) -> ApiResult<T> {
    match body {
        Ok(Json(Some(value))) => Ok(value),
        Ok(Json(None)) => Err(ApiError::bad_request("Request body is required")),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// Query-string extractor result; a rejection becomes a JSON 400.
pub type QueryParams<T> = Result<Query<T>, QueryRejection>;

pub fn require_query<T>(query: QueryParams<T>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Numeric query parameter where `?page=` (empty or blank) means absent.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// PATCH bodies must be a non-empty JSON object.
pub fn require_patch(body: JsonBody<PatchDocument>) -> ApiResult<PatchDocument> {
    let updates = require_body(body)?;
    if updates.is_empty() {
        return Err(ApiError::bad_request("Patch document must contain at least one field"));
    }
    Ok(updates)
}

/// Fetch a class or fail with 404.
pub async fn load_class(state: &AppState, id: &str) -> ApiResult<Class> {
    GetClassByIdHandler::new(state.repository.clone())
        .handle(GetClassByIdQuery { id: id.to_string() })
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Class {} not found", id)))
}
