use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};

use crate::app::AppState;
use crate::cqrs::{CommandHandler, GetExamsHandler, GetExamsQuery, QueryHandler, UpdateClassCommand, UpdateClassHandler};
use crate::error::{ApiError, ApiResult};
use crate::models::{Class, Exam, ExamRequest};
use crate::patch::{apply_patch, PatchDocument};

use super::utils::{load_class, require_body, require_patch, JsonBody};

fn exam_not_found(class_id: &str, exam_id: &str) -> ApiError {
    ApiError::not_found(format!("Exam {} not found in class {}", exam_id, class_id))
}

/// Write the whole class back after an exam change.
async fn save(state: &AppState, class: Class) -> ApiResult<Class> {
    let stored = UpdateClassHandler::new(state.repository.clone())
        .handle(UpdateClassCommand {
            id: class.id.clone(),
            class,
        })
        .await?;
    Ok(stored)
}

/// GET /api/v1/classes/:id/exams
pub async fn list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<Exam>>> {
    GetExamsHandler::new(state.repository.clone())
        .handle(GetExamsQuery { class_id: id.clone() })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Class {} not found", id)))
}

/// POST /api/v1/classes/:id/exams - Append an exam
pub async fn create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<ExamRequest>,
) -> ApiResult<impl IntoResponse> {
    let exam = require_body(body)?.into_exam();
    let mut class = load_class(&state, &id).await?;

    if class.find_exam(&exam.id).is_some() {
        return Err(ApiError::conflict(format!(
            "Exam {} already exists in class {}",
            exam.id, id
        )));
    }

    // The Location header must be buildable before anything is written
    let location = HeaderValue::try_from(format!("/api/v1/classes/{}/exams/{}", id, exam.id))
        .map_err(|_| ApiError::bad_request("Exam id contains characters not allowed in a header"))?;

    class.exams.push(exam.clone());
    save(&state, class).await?;

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(exam)))
}

/// GET /api/v1/classes/:id/exams/:examId
pub async fn get(
    State(state): State<AppState>,
    Path((id, exam_id)): Path<(String, String)>,
) -> ApiResult<Json<Exam>> {
    let class = load_class(&state, &id).await?;
    class
        .find_exam(&exam_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| exam_not_found(&id, &exam_id))
}

/// PUT /api/v1/classes/:id/exams/:examId - Replace name, date and weight
pub async fn put(
    State(state): State<AppState>,
    Path((id, exam_id)): Path<(String, String)>,
    body: JsonBody<ExamRequest>,
) -> ApiResult<Json<Exam>> {
    let request = require_body(body)?;
    let mut class = load_class(&state, &id).await?;

    let exam = class
        .find_exam_mut(&exam_id)
        .ok_or_else(|| exam_not_found(&id, &exam_id))?;
    exam.replace_contents(request.name, request.date, request.weight);
    let updated = exam.clone();

    save(&state, class).await?;
    Ok(Json(updated))
}

/// PATCH /api/v1/classes/:id/exams/:examId
pub async fn patch(
    State(state): State<AppState>,
    Path((id, exam_id)): Path<(String, String)>,
    body: JsonBody<PatchDocument>,
) -> ApiResult<Json<Exam>> {
    let updates = require_patch(body)?;
    let mut class = load_class(&state, &id).await?;

    let exam = class
        .find_exam_mut(&exam_id)
        .ok_or_else(|| exam_not_found(&id, &exam_id))?;
    apply_patch(exam, &updates);
    let updated = exam.clone();

    save(&state, class).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/classes/:id/exams/:examId
pub async fn delete(
    State(state): State<AppState>,
    Path((id, exam_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut class = load_class(&state, &id).await?;

    if class.remove_exam(&exam_id).is_none() {
        return Err(exam_not_found(&id, &exam_id));
    }

    save(&state, class).await?;
    Ok(StatusCode::NO_CONTENT)
}
