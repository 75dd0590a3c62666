//! Route handlers.

use super::{ApiError, AppState};
use crate::coach;
use crate::store::ExerciseFilter;
use crate::types::*;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

type ApiResult<T> = Result<T, ApiError>;

/// Unwrap a JSON body, mapping any rejection to a 400 with `message`
fn body<T>(payload: Result<Json<T>, JsonRejection>, message: &'static str) -> ApiResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::BadRequest(message))
        }
    }
}

/// Unwrap query parameters, mapping any rejection to a 400
fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    match params {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected query string: {}", rejection.body_text());
            Err(ApiError::BadRequest("Invalid query parameters"))
        }
    }
}

/// Leading decimal digits of `text` after optional whitespace and `+`
///
/// `"3abc"` reads as 3. Text with no leading digits, or a negative value,
/// gives `None`.
fn leading_limit(text: &str) -> Option<usize> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

// ----------------------------------------------------------------------------
// Exercises
// ----------------------------------------------------------------------------

pub(super) async fn list_exercises(
    State(state): State<AppState>,
    filter: Result<Query<ExerciseFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Exercise>>> {
    let filter = query(filter)?;
    Ok(Json(state.store.read()?.list_exercises(&filter)))
}

pub(super) async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Exercise>> {
    state
        .store
        .read()?
        .get_exercise(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Exercise not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExerciseAdviceResponse {
    exercise_id: String,
    advice: String,
}

pub(super) async fn exercise_advice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExerciseAdviceResponse>> {
    let advice = coach::exercise_advice(&state.store, &state.advisor, &state.user_id, &id)
        .await?
        .ok_or(ApiError::NotFound("Exercise not found"))?;
    Ok(Json(ExerciseAdviceResponse {
        exercise_id: id,
        advice,
    }))
}

// ----------------------------------------------------------------------------
// Workout templates
// ----------------------------------------------------------------------------

pub(super) async fn list_workout_templates(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<WorkoutTemplate>>> {
    Ok(Json(
        state.store.read()?.list_workout_templates(&state.user_id),
    ))
}

pub(super) async fn get_workout_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkoutTemplate>> {
    state
        .store
        .read()?
        .get_workout_template(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Workout template not found"))
}

pub(super) async fn create_workout_template(
    State(state): State<AppState>,
    payload: Result<Json<NewWorkoutTemplate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WorkoutTemplate>)> {
    let mut new = body(payload, "Invalid workout template data")?;
    new.user_id = Some(state.user_id.clone());
    let template = state.store.write()?.create_workout_template(new);
    Ok((StatusCode::CREATED, Json(template)))
}

pub(super) async fn update_workout_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<WorkoutTemplatePatch>, JsonRejection>,
) -> ApiResult<Json<WorkoutTemplate>> {
    let patch = body(payload, "Invalid workout template data")?;
    state
        .store
        .write()?
        .update_workout_template(&id, patch)
        .map(Json)
        .ok_or(ApiError::NotFound("Workout template not found"))
}

pub(super) async fn delete_workout_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.write()?.delete_workout_template(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Workout template not found"))
    }
}

// ----------------------------------------------------------------------------
// Workout sessions
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct SessionsQuery {
    /// Read leniently; unparsable limits are ignored rather than rejected
    limit: Option<String>,
}

pub(super) async fn list_workout_sessions(
    State(state): State<AppState>,
    params: Result<Query<SessionsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<WorkoutSession>>> {
    let limit = query(params)?.limit.as_deref().and_then(leading_limit);
    Ok(Json(
        state
            .store
            .read()?
            .list_workout_sessions(&state.user_id, limit),
    ))
}

pub(super) async fn get_workout_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkoutSession>> {
    state
        .store
        .read()?
        .get_workout_session(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Workout session not found"))
}

pub(super) async fn create_workout_session(
    State(state): State<AppState>,
    payload: Result<Json<NewWorkoutSession>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WorkoutSession>)> {
    let mut new = body(payload, "Invalid workout session data")?;
    new.user_id = Some(state.user_id.clone());
    let session = state.store.write()?.create_workout_session(new);
    Ok((StatusCode::CREATED, Json(session)))
}

pub(super) async fn update_workout_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<WorkoutSessionPatch>, JsonRejection>,
) -> ApiResult<Json<WorkoutSession>> {
    let patch = body(payload, "Invalid workout session data")?;
    state
        .store
        .write()?
        .update_workout_session(&id, patch)
        .map(Json)
        .ok_or(ApiError::NotFound("Workout session not found"))
}

// ----------------------------------------------------------------------------
// Exercise logs
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LogsQuery {
    exercise_id: Option<String>,
}

pub(super) async fn list_exercise_logs(
    State(state): State<AppState>,
    params: Result<Query<LogsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ExerciseLog>>> {
    let params = query(params)?;
    Ok(Json(state.store.read()?.list_exercise_logs(
        &state.user_id,
        params.exercise_id.as_deref(),
    )))
}

pub(super) async fn create_exercise_log(
    State(state): State<AppState>,
    payload: Result<Json<NewExerciseLog>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ExerciseLog>)> {
    let mut new = body(payload, "Invalid exercise log data")?;
    new.user_id = Some(state.user_id.clone());
    let log = state.store.write()?.create_exercise_log(new);
    Ok((StatusCode::CREATED, Json(log)))
}

// ----------------------------------------------------------------------------
// AI suggestions
// ----------------------------------------------------------------------------

pub(super) async fn list_ai_suggestions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AiSuggestion>>> {
    Ok(Json(state.store.read()?.list_ai_suggestions(&state.user_id)))
}

pub(super) async fn generate_ai_suggestions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AiSuggestion>>> {
    let created = coach::generate_suggestions(&state.store, &state.advisor, &state.user_id).await?;
    Ok(Json(created))
}

pub(super) async fn mark_ai_suggestion_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.write()?.mark_ai_suggestion_read(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("AI suggestion not found"))
    }
}

// ----------------------------------------------------------------------------
// Stats
// ----------------------------------------------------------------------------

pub(super) async fn user_stats(State(state): State<AppState>) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.store.read()?.user_stats(&state.user_id)))
}
