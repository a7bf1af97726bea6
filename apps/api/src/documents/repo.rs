//! Ownership-checked folder and document CRUD.
//!
//! Every query is scoped by `user_id`; another user's rows read as missing.
//! New names are resolved against their siblings and the insert retried when
//! a concurrent request claimed the same name first.

use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::naming::{
    normalize_name, resolve_unique_name, DEFAULT_DOCUMENT_TITLE, DEFAULT_FOLDER_NAME,
};
use crate::documents::store::StoreError;
use crate::models::document::{ContentEnvelope, DocumentRow, FolderRow};

const MAX_NAME_ATTEMPTS: usize = 3;
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

async fn ensure_folder(pool: &PgPool, user_id: Uuid, folder_id: Option<Uuid>) -> Result<(), StoreError> {
    let Some(folder_id) = folder_id else {
        return Ok(());
    };
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM folders WHERE id = $1 AND user_id = $2")
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    exists.map(|_| ()).ok_or(StoreError::FolderNotFound(folder_id))
}

// ────────────────────────────────────────────────────────────────────────────
// Folders
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_folders(pool: &PgPool, user_id: Uuid) -> Result<Vec<FolderRow>, StoreError> {
    let folders = sqlx::query_as("SELECT * FROM folders WHERE user_id = $1 ORDER BY name, created_at")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(folders)
}

async fn sibling_folder_names(
    pool: &PgPool,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    exclude: Option<Uuid>,
) -> Result<Vec<String>, StoreError> {
    let names = sqlx::query_scalar(
        "SELECT name FROM folders \
         WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND id IS DISTINCT FROM $3",
    )
    .bind(user_id)
    .bind(parent_id)
    .bind(exclude)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub async fn create_folder(
    pool: &PgPool,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    name: Option<&str>,
) -> Result<FolderRow, StoreError> {
    ensure_folder(pool, user_id, parent_id).await?;
    let base = normalize_name(name, DEFAULT_FOLDER_NAME);

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let siblings = sibling_folder_names(pool, user_id, parent_id, None).await?;
        let name = resolve_unique_name(&base, &siblings);
        let inserted = sqlx::query_as(
            "INSERT INTO folders (id, user_id, parent_id, name) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(parent_id)
        .bind(&name)
        .fetch_one(pool)
        .await;
        match inserted {
            Ok(folder) => {
                info!("Created folder '{name}' for user {user_id}");
                return Ok(folder);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Folder name '{name}' taken concurrently (attempt {attempt}), retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::NameConflict(base))
}

pub async fn rename_folder(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    name: &str,
) -> Result<FolderRow, StoreError> {
    let parent_id: Option<Option<Uuid>> =
        sqlx::query_scalar("SELECT parent_id FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let parent_id = parent_id.ok_or(StoreError::FolderNotFound(id))?;
    let base = normalize_name(Some(name), DEFAULT_FOLDER_NAME);

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let siblings = sibling_folder_names(pool, user_id, parent_id, Some(id)).await?;
        let name = resolve_unique_name(&base, &siblings);
        let updated: Result<Option<FolderRow>, _> =
            sqlx::query_as("UPDATE folders SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING *")
                .bind(&name)
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await;
        match updated {
            Ok(folder) => {
                info!("Renamed folder {id} to '{name}'");
                return folder.ok_or(StoreError::FolderNotFound(id));
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Folder name '{name}' taken concurrently (attempt {attempt}), retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::NameConflict(base))
}

/// Deletes a folder. Its documents move to the root and its subfolders move
/// up to the deleted folder's parent.
pub async fn delete_folder(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    let parent_id: Option<Option<Uuid>> =
        sqlx::query_scalar("SELECT parent_id FROM folders WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let parent_id = parent_id.ok_or(StoreError::FolderNotFound(id))?;

    sqlx::query("UPDATE documents SET folder_id = NULL WHERE folder_id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE folders SET parent_id = $1 WHERE parent_id = $2 AND user_id = $3")
        .bind(parent_id)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("Deleted folder {id} of user {user_id}");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

/// Lists a user's documents, newest edit first. `folder_id = None` lists all.
pub async fn list_documents(
    pool: &PgPool,
    user_id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<Vec<DocumentRow>, StoreError> {
    let docs = match folder_id {
        Some(folder_id) => {
            sqlx::query_as(
                "SELECT * FROM documents WHERE user_id = $1 AND folder_id = $2 ORDER BY updated_at DESC",
            )
            .bind(user_id)
            .bind(folder_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM documents WHERE user_id = $1 ORDER BY updated_at DESC")
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(docs)
}

pub struct NewDocument<'a> {
    pub folder_id: Option<Uuid>,
    pub title: Option<&'a str>,
    pub company: Option<&'a str>,
    pub role: Option<&'a str>,
    /// Initial body; an empty document when absent.
    pub html: Option<&'a str>,
}

pub async fn create_document(
    pool: &PgPool,
    user_id: Uuid,
    new: NewDocument<'_>,
) -> Result<DocumentRow, StoreError> {
    ensure_folder(pool, user_id, new.folder_id).await?;
    let base = normalize_name(new.title, DEFAULT_DOCUMENT_TITLE);
    let content: Value = ContentEnvelope::from_html(new.html.unwrap_or_default()).to_value();

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let siblings: Vec<String> = sqlx::query_scalar(
            "SELECT title FROM documents WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2",
        )
        .bind(user_id)
        .bind(new.folder_id)
        .fetch_all(pool)
        .await?;
        let title = resolve_unique_name(&base, &siblings);
        let inserted = sqlx::query_as(
            r#"
            INSERT INTO documents (id, user_id, folder_id, title, content, company, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.folder_id)
        .bind(&title)
        .bind(&content)
        .bind(new.company)
        .bind(new.role)
        .fetch_one(pool)
        .await;
        match inserted {
            Ok(doc) => {
                info!("Created document '{title}' for user {user_id}");
                return Ok(doc);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Document title '{title}' taken concurrently (attempt {attempt}), retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::NameConflict(base))
}

pub async fn move_document(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<(), StoreError> {
    ensure_folder(pool, user_id, folder_id).await?;
    let result = sqlx::query(
        "UPDATE documents SET folder_id = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
    )
    .bind(folder_id)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }
    info!("Moved document {id} to folder {folder_id:?}");
    Ok(())
}

pub async fn delete_document(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }
    info!("Deleted document {id} of user {user_id}");
    Ok(())
}
