mod embedded;

use embedded::migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tokio_rusqlite::Connection;

use crate::{
    error::{Error, Result},
    models::Note,
};

type RawNote = (i64, String, String, String, String);

/// Data access for the `notes` table.
///
/// Cloning is cheap: every clone shares the same underlying connection, which
/// executes statements one at a time on its own thread.
#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).await?;

        Ok(Self { conn })
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;

        Ok(Self { conn })
    }

    /// Creates the `notes` table if it does not exist yet. Safe to call repeatedly.
    pub async fn migrate(&self) -> Result<()> {
        let applied = self
            .conn
            .call(|conn| {
                Ok(migrations::runner()
                    .run(conn)
                    .map(|report| {
                        report
                            .applied_migrations()
                            .iter()
                            .map(|migration| {
                                format!("V{}__{}", migration.version(), migration.name())
                            })
                            .collect::<Vec<_>>()
                    })
                    .map_err(|e| e.to_string()))
            })
            .await
            .map_err(|e| Error::Schema(e.to_string()))?
            .map_err(Error::Schema)?;

        for migration in applied {
            tracing::info!("Migration applied - {}", migration);
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    /// Inserts a note stamped with the current time and returns its new ID.
    pub async fn create_note(&self, title: String, description: String) -> Result<i64> {
        let now = encode_dt(Utc::now());

        let (affected, id) = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "INSERT INTO notes (title, description, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?3)",
                )?;
                let affected = stmt.execute(rusqlite::params![title, description, now])?;

                Ok((affected, conn.last_insert_rowid()))
            })
            .await?;

        expect_one_row(affected)?;

        Ok(id)
    }

    pub async fn get_all_notes(&self) -> Result<Vec<Note>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, description, created_at, updated_at \
                     FROM notes ORDER BY id",
                )?;
                let rows = stmt
                    .query_map([], raw_note)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(rows)
            })
            .await?;

        rows.into_iter().map(decode_note).collect()
    }

    pub async fn get_one_note(&self, id: i64) -> Result<Note> {
        let row = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, description, created_at, updated_at \
                     FROM notes WHERE id = ?1",
                )?;
                let row = stmt.query_row([id], raw_note).optional()?;

                Ok(row)
            })
            .await?;

        row.ok_or(Error::NotFound(id)).and_then(decode_note)
    }

    /// Replaces title and description of an existing note and refreshes `updated_at`.
    pub async fn update_note(&self, id: i64, title: String, description: String) -> Result<()> {
        let now = encode_dt(Utc::now());

        let affected = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "UPDATE notes SET title = ?1, description = ?2, updated_at = ?3 \
                     WHERE id = ?4",
                )?;

                Ok(stmt.execute(rusqlite::params![title, description, now, id])?)
            })
            .await?;

        expect_one_row(affected)
    }

    pub async fn delete_note(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("DELETE FROM notes WHERE id = ?1")?;

                Ok(stmt.execute([id])?)
            })
            .await?;

        expect_one_row(affected)
    }
}

const fn expect_one_row(affected: usize) -> Result<()> {
    if affected == 1 {
        Ok(())
    } else {
        Err(Error::RowsAffected(affected))
    }
}

fn raw_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawNote> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_note((id, title, description, created_at, updated_at): RawNote) -> Result<Note> {
    Ok(Note {
        id,
        title,
        description,
        created_at: decode_dt(&created_at)?,
        updated_at: decode_dt(&updated_at)?,
    })
}

fn encode_dt(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Timestamp(format!("{s}: {e}")))
}
