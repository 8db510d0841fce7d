use crate::{
    dto::{NoteRequest, NoteResponse},
    error::{Error, Result},
    repository::Repository,
};

#[derive(Clone)]
pub struct NoteService {
    repo: Repository,
}

impl NoteService {
    pub const fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create_note(&self, request: NoteRequest) -> Result<i64> {
        self.repo
            .create_note(request.title, request.description)
            .await
    }

    pub async fn update_note(&self, request: NoteRequest) -> Result<()> {
        let id = request
            .id
            .ok_or_else(|| Error::Validation("id is required".to_string()))?;

        self.repo
            .update_note(id, request.title, request.description)
            .await
    }

    pub async fn delete_note(&self, id: i64) -> Result<()> {
        self.repo.delete_note(id).await
    }

    pub async fn get_one_note(&self, id: i64) -> Result<NoteResponse> {
        self.repo.get_one_note(id).await.map(NoteResponse::from)
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>> {
        self.repo
            .get_all_notes()
            .await
            .map(|notes| notes.into_iter().map(NoteResponse::from).collect())
    }
}
