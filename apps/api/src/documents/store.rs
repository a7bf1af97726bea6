//! Persistence seam used by the autosave driver and the HTTP handlers.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::document::{DocumentRow, MetaField};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(Uuid),

    #[error("folder {0} not found")]
    FolderNotFound(Uuid),

    #[error("could not find a free name for '{0}'")]
    NameConflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every call is scoped by owner; a document owned by someone else reads as missing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<DocumentRow, StoreError>;

    async fn update_title(&self, user_id: Uuid, id: Uuid, title: &str) -> Result<(), StoreError>;

    async fn update_content(&self, user_id: Uuid, id: Uuid, content: &Value) -> Result<(), StoreError>;

    async fn update_metadata(
        &self,
        user_id: Uuid,
        id: Uuid,
        field: MetaField,
        value: Option<&str>,
    ) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn expect_one(rows: u64, id: Uuid) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound(id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<DocumentRow, StoreError> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT * FROM documents WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.ok_or(StoreError::NotFound(id))
    }

    async fn update_title(&self, user_id: Uuid, id: Uuid, title: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET title = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
        )
        .bind(title)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), id)?;
        info!("Saved title of document {id}");
        Ok(())
    }

    async fn update_content(&self, user_id: Uuid, id: Uuid, content: &Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET content = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
        )
        .bind(content)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), id)?;
        info!("Saved content of document {id}");
        Ok(())
    }

    async fn update_metadata(
        &self,
        user_id: Uuid,
        id: Uuid,
        field: MetaField,
        value: Option<&str>,
    ) -> Result<(), StoreError> {
        // The column name comes from a closed enum, never from input.
        let sql = format!(
            "UPDATE documents SET {} = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
            field.column()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), id)?;
        info!("Saved {} of document {id}", field.column());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store for driver and handler tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub docs: Mutex<HashMap<Uuid, DocumentRow>>,
        pub writes: Mutex<Vec<String>>,
        pub fail: Mutex<bool>,
        /// Per-write delays, consumed in call order.
        pub latencies: Mutex<VecDeque<Duration>>,
    }

    impl MemoryStore {
        pub fn with_doc(user_id: Uuid, id: Uuid, title: &str, content: Value) -> Self {
            let store = Self::default();
            let now = Utc::now();
            store.docs.lock().unwrap().insert(
                id,
                DocumentRow {
                    id,
                    user_id,
                    folder_id: None,
                    title: title.to_string(),
                    content,
                    company: None,
                    role: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            store
        }

        pub fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        async fn delay(&self) {
            let latency = self.latencies.lock().unwrap().pop_front();
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
        }

        fn write(
            &self,
            user_id: Uuid,
            id: Uuid,
            label: String,
            apply: impl FnOnce(&mut DocumentRow),
        ) -> Result<(), StoreError> {
            if *self.fail.lock().unwrap() {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            let mut docs = self.docs.lock().unwrap();
            let row = docs
                .get_mut(&id)
                .filter(|row| row.user_id == user_id)
                .ok_or(StoreError::NotFound(id))?;
            apply(row);
            self.writes.lock().unwrap().push(label);
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<DocumentRow, StoreError> {
            self.docs
                .lock()
                .unwrap()
                .get(&id)
                .filter(|row| row.user_id == user_id)
                .cloned()
                .ok_or(StoreError::NotFound(id))
        }

        async fn update_title(&self, user_id: Uuid, id: Uuid, title: &str) -> Result<(), StoreError> {
            self.delay().await;
            self.write(user_id, id, format!("title:{title}"), |row| {
                row.title = title.to_string()
            })
        }

        async fn update_content(&self, user_id: Uuid, id: Uuid, content: &Value) -> Result<(), StoreError> {
            self.delay().await;
            let html = crate::models::document::ContentEnvelope::from_value(content).to_html();
            self.write(user_id, id, format!("content:{html}"), |row| {
                row.content = content.clone()
            })
        }

        async fn update_metadata(
            &self,
            user_id: Uuid,
            id: Uuid,
            field: MetaField,
            value: Option<&str>,
        ) -> Result<(), StoreError> {
            self.delay().await;
            let label = format!("{}:{}", field.column(), value.unwrap_or(""));
            self.write(user_id, id, label, |row| {
                let value = value.map(str::to_string);
                match field {
                    MetaField::Company => row.company = value,
                    MetaField::Role => row.role = value,
                }
            })
        }
    }
}
