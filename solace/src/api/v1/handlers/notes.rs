//! v1 Note handlers.

use axum::extract::{Path, State};
use axum::Extension;
use axum_extra::extract::Query;
use nanoid::nanoid;
use validator::Validate;

use crate::api::v1::dto::{
    CreateNoteRequest, DeleteNoteResponse, ListNotesQuery, ListNotesResponse, NoteResponse,
    PageParams, UpdateNoteRequest,
};
use crate::api::v1::middleware::AuthUser;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::Note;

/// `POST /api/v1/notes`
///
/// Creates the note in the unscored pending state; the background
/// classifier settles its emotion vector asynchronously. Poll
/// `GET /v1/notes/{noteId}` for the result.
#[utoipa::path(
    post,
    path = "/api/v1/notes",
    tag = "notes",
    operation_id = "notes.create",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created, classification queued", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    axum::Json(req): axum::Json<CreateNoteRequest>,
) -> ApiResponse<NoteResponse> {
    if req.content.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Content cannot be empty");
    }
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let note = Note::new(nanoid!(), user.id, req.content);
    if let Err(e) = state.db.create_note(&note).await {
        return e.into();
    }

    ApiResponse::created(NoteResponse::from(note))
}

/// `GET /api/v1/notes`
#[utoipa::path(
    get,
    path = "/api/v1/notes",
    tag = "notes",
    operation_id = "notes.list",
    params(ListNotesQuery),
    responses(
        (status = 200, description = "Notes listed newest first", body = ListNotesResponse),
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<ListNotesQuery>,
) -> ApiResponse<ListNotesResponse> {
    let params = PageParams::resolve(query.limit, query.cursor.as_deref());

    let (notes, total) = match state
        .db
        .list_notes(&user.id, params.limit, params.offset)
        .await
    {
        Ok(result) => result,
        Err(e) => return e.into(),
    };

    let notes = notes.into_iter().map(NoteResponse::from).collect();
    ApiResponse::success_with_meta(ListNotesResponse { notes }, params.meta(total))
}

/// `GET /api/v1/notes/{noteId}`
#[utoipa::path(
    get,
    path = "/api/v1/notes/{noteId}",
    tag = "notes",
    operation_id = "notes.get",
    params(("noteId" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ApiError),
    )
)]
pub async fn get_note(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResponse<NoteResponse> {
    match state.db.get_note_by_id(&id).await {
        Ok(Some(note)) if note.user_id == user.id => {
            ApiResponse::success(NoteResponse::from(note))
        }
        Ok(_) => ApiResponse::error(ErrorCode::NotFound, format!("Note {id} not found")),
        Err(e) => e.into(),
    }
}

/// `PATCH /api/v1/notes/{noteId}`
///
/// Replaces the content and re-queues the note for classification; the
/// previous emotion scores are discarded.
#[utoipa::path(
    patch,
    path = "/api/v1/notes/{noteId}",
    tag = "notes",
    operation_id = "notes.update",
    params(("noteId" = String, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated, classification re-queued", body = NoteResponse),
        (status = 404, description = "Note not found", body = ApiError),
    )
)]
pub async fn update_note(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    axum::Json(req): axum::Json<UpdateNoteRequest>,
) -> ApiResponse<NoteResponse> {
    if req.content.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Content cannot be empty");
    }
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    match state.db.get_note_by_id(&id).await {
        Ok(Some(note)) if note.user_id == user.id => {}
        Ok(_) => return ApiResponse::error(ErrorCode::NotFound, format!("Note {id} not found")),
        Err(e) => return e.into(),
    }

    if let Err(e) = state.db.update_note_content(&id, &req.content).await {
        return e.into();
    }

    match state.db.get_note_by_id(&id).await {
        Ok(Some(note)) => ApiResponse::success(NoteResponse::from(note)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Note {id} not found")),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/notes/{noteId}`
#[utoipa::path(
    delete,
    path = "/api/v1/notes/{noteId}",
    tag = "notes",
    operation_id = "notes.delete",
    params(("noteId" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted", body = DeleteNoteResponse),
        (status = 404, description = "Note not found", body = ApiError),
    )
)]
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResponse<DeleteNoteResponse> {
    match state.db.get_note_by_id(&id).await {
        Ok(Some(note)) if note.user_id == user.id => {}
        Ok(_) => return ApiResponse::error(ErrorCode::NotFound, format!("Note {id} not found")),
        Err(e) => return e.into(),
    }

    match state.db.delete_note(&id).await {
        Ok(deleted) => ApiResponse::success(DeleteNoteResponse {
            note_id: id,
            deleted,
        }),
        Err(e) => e.into(),
    }
}
