use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Note;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID, omitted until the store assigns one
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note description
    pub description: String,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body accepted by both `POST /notes` and `PUT /notes`.
///
/// Timestamps sent by the client are ignored; the repository stamps them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteRequest {
    /// Note ID, required for updates and ignored on create
    #[serde(default)]
    pub id: Option<i64>,
    /// Note title
    pub title: String,
    /// Note description
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteQuery {
    pub id: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_unassigned(id: &i64) -> bool {
    *id == 0
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            description: note.description,
            created_at: Some(note.created_at),
            updated_at: Some(note.updated_at),
        }
    }
}
