use crate::dtos::{CreateScriptRequest, CreateScriptResponse, EditScriptParams, ScriptResponse};
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::models::{ScriptDocument, ScriptEdit};
use crate::services::{DeleteOutcome, UpdateOutcome};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|e| {
        tracing::warn!(script_id = %raw, "Rejected malformed script id");
        AppError::from(e)
    })
}

fn to_responses(scripts: Vec<ScriptDocument>) -> Vec<ScriptResponse> {
    scripts.into_iter().map(ScriptResponse::from).collect()
}

/// `POST /scripts`: generate, then persist. The response is written once,
/// after both steps succeed.
pub async fn create_script(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateScriptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let generated_script = state
        .generator
        .generate(&request.synopsis, &request.genre)
        .await?;

    let script = ScriptDocument::new(
        request.title,
        request.genre,
        request.synopsis,
        request.email,
        generated_script,
    );

    let result = state.store.insert(&script).await?;

    tracing::info!(
        script_id = %result.inserted_id,
        email = %script.email,
        "Generated script stored"
    );

    Ok((StatusCode::CREATED, Json(CreateScriptResponse { result })))
}

/// `GET /scripts`
pub async fn list_scripts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScriptResponse>>, AppError> {
    let scripts = state.store.list_all().await?;
    Ok(Json(to_responses(scripts)))
}

/// `GET /scripts/:email`, behind [`crate::middleware::auth_middleware`].
pub async fn list_scripts_by_email(
    State(state): State<AppState>,
    user: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<ScriptResponse>>, AppError> {
    user.ensure_owner(&email)?;

    let scripts = state.store.list_by_email(&email).await?;
    tracing::debug!(email = %email, count = scripts.len(), "Listed scripts for owner");

    Ok(Json(to_responses(scripts)))
}

/// `GET /specific-scripts/:id`: the script, or `null` when absent.
pub async fn get_script(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<ScriptResponse>>, AppError> {
    let id = parse_id(&id)?;
    let script = state.store.find_by_id(&id).await?;
    Ok(Json(script.map(ScriptResponse::from)))
}

/// `PUT /edit-scripts/:id`. Plain updates 404 on an unknown id;
/// `?upsert=true` creates the record instead.
pub async fn edit_script(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EditScriptParams>,
    JsonBody(edit): JsonBody<ScriptEdit>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = parse_id(&id)?;

    if params.upsert {
        let outcome = state.store.upsert_by_id(&id, &edit).await?;
        if outcome.upserted_id.is_some() {
            tracing::info!(script_id = %id, "Script created by upsert");
        }
        return Ok(Json(outcome));
    }

    let outcome = state.store.update_by_id(&id, &edit).await?;
    if outcome.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Script {} not found", id)));
    }

    tracing::info!(script_id = %id, "Script updated");
    Ok(Json(outcome))
}

/// `DELETE /scripts/:id`. Deleting an unknown id succeeds with a zero count.
pub async fn delete_script(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let id = parse_id(&id)?;
    let outcome = state.store.delete_by_id(&id).await?;

    tracing::info!(
        script_id = %id,
        deleted = outcome.deleted_count,
        "Script delete processed"
    );

    Ok(Json(outcome))
}
