use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{NoteQuery, NoteRequest, NoteResponse},
    error::Error,
    service::NoteService,
};

#[derive(OpenApi)]
#[openapi(
    paths(list_notes, create_note, update_note, delete_note),
    components(schemas(NoteResponse, NoteRequest)),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

pub fn router(service: Arc<NoteService>) -> Router {
    Router::new()
        .route("/", any(root))
        .route(
            "/notes",
            get(list_notes)
                .post(create_note)
                .put(update_note)
                .delete(delete_note)
                .fallback(method_not_allowed),
        )
        .route("/api-doc/openapi.json", get(openapi))
        .with_state(service)
}

async fn root() -> Response {
    (StatusCode::OK, "hola mundo").into_response()
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// Unsupported methods on /notes answer 400.
async fn method_not_allowed() -> Response {
    (StatusCode::BAD_REQUEST, "method not allowed").into_response()
}

#[utoipa::path(
    get,
    path = "/notes",
    params(
        ("id" = Option<i64>, Query, description = "Return only the note with this ID; non-numeric values list all notes")
    ),
    responses(
        (status = 200, description = "List of all notes, or the requested note", body = Vec<NoteResponse>),
        (status = 404, description = "Note not found or notes could not be listed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn list_notes(
    State(service): State<Arc<NoteService>>,
    Query(query): Query<NoteQuery>,
) -> Response {
    if let Some(id) = query.id.as_deref().and_then(|id| id.parse::<i64>().ok()) {
        return get_one_note(&service, id).await;
    }

    match service.get_all_notes().await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => {
            tracing::error!("failed to get note entries: {}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

async fn get_one_note(service: &NoteService, id: i64) -> Response {
    match service.get_one_note(id).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => failure("failed to get note entry", e),
    }
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note created successfully"),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(State(service): State<Arc<NoteService>>, body: Bytes) -> Response {
    let request = match decode(&body) {
        Ok(request) => request,
        Err(e) => return failure("failed to decode note", e),
    };

    match service.create_note(request).await {
        Ok(id) => {
            tracing::debug!("created note {}", id);
            StatusCode::OK.into_response()
        }
        Err(e) => failure("failed to create note entry", e),
    }
}

#[utoipa::path(
    put,
    path = "/notes",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated successfully"),
        (status = 400, description = "Malformed request body or missing id"),
        (status = 500, description = "Note not updated")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(State(service): State<Arc<NoteService>>, body: Bytes) -> Response {
    let request = match decode(&body) {
        Ok(request) => request,
        Err(e) => return failure("failed to decode note", e),
    };

    match service.update_note(request).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => failure("failed to update note entry", e),
    }
}

#[utoipa::path(
    delete,
    path = "/notes",
    params(
        ("id" = i64, Query, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully"),
        (status = 400, description = "Missing or non-numeric id"),
        (status = 500, description = "Note not deleted")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    Query(query): Query<NoteQuery>,
) -> Response {
    let id = match required_id(&query) {
        Ok(id) => id,
        Err(e) => return failure("invalid note id", e),
    };

    match service.delete_note(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => failure("failed to delete note entry", e),
    }
}

fn decode(body: &[u8]) -> Result<NoteRequest, Error> {
    Ok(serde_json::from_slice(body)?)
}

fn required_id(query: &NoteQuery) -> Result<i64, Error> {
    match query.id.as_deref() {
        None | Some("") => Err(Error::Validation(
            "query parameter id is required".to_string(),
        )),
        Some(raw) => raw.parse().map_err(|_| {
            Error::Validation("query parameter id must be a number".to_string())
        }),
    }
}

/// Logs the failure and renders it with the status of its kind.
fn failure(context: &str, e: Error) -> Response {
    if e.is_persistence() {
        tracing::error!("{}: {}", context, e);
    } else {
        tracing::warn!("{}: {}", context, e);
    }

    e.into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::repository::Repository;

    async fn app() -> Router {
        let repo = Repository::open_in_memory().await.unwrap();
        repo.migrate().await.unwrap();
        router(Arc::new(NoteService::new(repo)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn list(app: &Router) -> Vec<serde_json::Value> {
        let (status, body) = send(app, "GET", "/notes", "").await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_str(&body).unwrap()
    }

    #[tokio::test]
    async fn root_greets() {
        let app = app().await;

        assert_eq!(
            send(&app, "GET", "/", "").await,
            (StatusCode::OK, "hola mundo".to_string())
        );
    }

    #[tokio::test]
    async fn created_note_is_listed() {
        let app = app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/notes",
            r#"{"title":"a","description":"b"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let notes = list(&app).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["title"], "a");
        assert_eq!(notes[0]["description"], "b");
        assert!(notes[0]["id"].as_i64().unwrap() > 0);
        assert!(notes[0]["created_at"].is_string());
        assert_eq!(notes[0]["created_at"], notes[0]["updated_at"]);
    }

    #[tokio::test]
    async fn list_is_json() {
        let app = app().await;
        let req = Request::builder()
            .uri("/notes")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"[]");
    }

    #[tokio::test]
    async fn list_failure_is_not_found() {
        let repo = Repository::open_in_memory().await.unwrap();
        let app = router(Arc::new(NoteService::new(repo)));

        let (status, body) = send(&app, "GET", "/notes", "").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("no such table"), "unexpected body: {body}");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = app().await;

        let (status, body) = send(&app, "POST", "/notes", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("invalid request body"));

        let (status, _) = send(&app, "PUT", "/notes", r#"{"id":"one"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let app = app().await;
        send(&app, "POST", "/notes", r#"{"title":"a","description":"b"}"#).await;
        let id = list(&app).await[0]["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "PUT",
            "/notes",
            &format!(r#"{{"id":{id},"title":"x","description":"y"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let notes = list(&app).await;
        assert_eq!(notes[0]["title"], "x");
        assert_eq!(notes[0]["description"], "y");
    }

    #[tokio::test]
    async fn update_missing_note_is_server_error() {
        let app = app().await;

        let (status, body) = send(
            &app,
            "PUT",
            "/notes",
            r#"{"id":999,"title":"x","description":"y"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "expected one affected row, got 0");
    }

    #[tokio::test]
    async fn update_without_id_is_bad_request() {
        let app = app().await;

        let (status, body) =
            send(&app, "PUT", "/notes", r#"{"title":"x","description":"y"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "id is required");
    }

    #[tokio::test]
    async fn delete_requires_id() {
        let app = app().await;

        let (status, body) = send(&app, "DELETE", "/notes", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("id is required"));

        let (status, _) = send(&app, "DELETE", "/notes?id=", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_rejects_non_numeric_id() {
        let app = app().await;

        let (status, body) = send(&app, "DELETE", "/notes?id=abc", "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("id must be a number"));
    }

    #[tokio::test]
    async fn delete_removes_note_once() {
        let app = app().await;
        send(&app, "POST", "/notes", r#"{"title":"a","description":"b"}"#).await;
        let id = list(&app).await[0]["id"].as_i64().unwrap();
        let uri = format!("/notes?id={id}");

        let (status, body) = send(&app, "DELETE", &uri, "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert!(list(&app).await.is_empty());

        let (status, _) = send(&app, "DELETE", &uri, "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn get_by_id() {
        let app = app().await;
        send(&app, "POST", "/notes", r#"{"title":"a"}"#).await;
        let id = list(&app).await[0]["id"].as_i64().unwrap();

        let (status, body) = send(&app, "GET", &format!("/notes?id={id}"), "").await;
        assert_eq!(status, StatusCode::OK);
        let note: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(note["id"], id);
        assert_eq!(note["description"], "");

        let (status, body) = send(&app, "GET", "/notes?id=999", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "note not found: 999");

    }

    #[tokio::test]
    async fn non_numeric_id_on_get_lists_all_notes() {
        let app = app().await;
        send(&app, "POST", "/notes", r#"{"title":"a"}"#).await;
        send(&app, "POST", "/notes", r#"{"title":"b"}"#).await;

        let (status, body) = send(&app, "GET", "/notes?id=abc", "").await;
        assert_eq!(status, StatusCode::OK);
        let notes: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(notes.len(), 2);

        let (status, body) = send(&app, "GET", "/notes?id=", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with('['));
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let app = app().await;

        let (status, body) = send(&app, "PATCH", "/notes", "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "method not allowed");
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/api-doc/openapi.json", "").await;

        assert_eq!(status, StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(doc["paths"]["/notes"]["get"].is_object());
        assert!(doc["paths"]["/notes"]["delete"].is_object());
    }
}
