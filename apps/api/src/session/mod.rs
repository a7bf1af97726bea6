//! Server-side editing sessions: one `Editor` plus its autosave task per
//! open document, fed by batches of editor commands.

pub mod commands;
pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::autosave::driver::AutosaveClosed;
use crate::autosave::{spawn_autosave, AutosaveConfig, AutosaveEvent, AutosaveHandle, SaveStatus};
use crate::catalog::CatalogError;
use crate::documents::store::{DocumentStore, StoreError};
use crate::editor::placeholders::PlaceholderContext;
use crate::editor::{Document, Editor, EditorError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Closed(#[from] AutosaveClosed),
}

pub struct EditSession {
    /// Owner of the document; scopes preset access.
    pub user_id: Uuid,
    pub editor: Editor,
    /// `None` once the session has been closed.
    autosave: Option<AutosaveHandle>,
}

impl EditSession {
    pub async fn send(&self, event: AutosaveEvent) -> Result<(), SessionError> {
        self.autosave.as_ref().ok_or(AutosaveClosed)?.send(event).await?;
        Ok(())
    }

    /// Queues the current body for autosave. Unchanged bodies are skipped
    /// by the controller.
    pub async fn push_body(&self) -> Result<(), SessionError> {
        self.send(AutosaveEvent::Body(self.editor.to_html())).await
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave
            .as_ref()
            .map_or(SaveStatus::Idle, AutosaveHandle::status)
    }
}

type SessionKey = (Uuid, Uuid);

struct Entry {
    session: Arc<Mutex<EditSession>>,
    last_used: Instant,
}

pub struct SessionRegistry {
    store: Arc<dyn DocumentStore>,
    config: AutosaveConfig,
    sessions: Mutex<HashMap<SessionKey, Entry>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn DocumentStore>, config: AutosaveConfig) -> Self {
        Self {
            store,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the open session for the document, opening it on first use.
    /// The row is fetched without holding the registry lock.
    pub async fn open(&self, user_id: Uuid, id: Uuid) -> Result<Arc<Mutex<EditSession>>, SessionError> {
        if let Some(session) = self.touch(user_id, id).await {
            return Ok(session);
        }

        let row = self.store.fetch(user_id, id).await?;

        let mut sessions = self.sessions.lock().await;
        let entry = sessions.entry((user_id, id)).or_insert_with(|| {
            let mut editor = Editor::new(Document::from_value(&row.content));
            editor.set_context(PlaceholderContext {
                company: row.company.clone(),
                role: row.role.clone(),
            });
            info!("Opened editing session for document {id}");
            Entry {
                session: Arc::new(Mutex::new(EditSession {
                    user_id,
                    editor,
                    autosave: Some(spawn_autosave(self.store.clone(), &row, self.config)),
                })),
                last_used: Instant::now(),
            }
        });
        entry.last_used = Instant::now();
        Ok(entry.session.clone())
    }

    async fn touch(&self, user_id: Uuid, id: Uuid) -> Option<Arc<Mutex<EditSession>>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&(user_id, id))?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    /// Closes the session, flushing pending saves. Returns false if none was open.
    pub async fn close(&self, user_id: Uuid, id: Uuid) -> bool {
        let entry = self.sessions.lock().await.remove(&(user_id, id));
        let Some(entry) = entry else {
            return false;
        };
        shutdown(entry.session).await;
        info!("Closed editing session for document {id}");
        true
    }

    /// Closes every session unused for at least `max_idle`. Returns how many.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let idle: Vec<(SessionKey, Entry)> = {
            let mut sessions = self.sessions.lock().await;
            let keys: Vec<SessionKey> = sessions
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_used) >= max_idle)
                .map(|(key, _)| *key)
                .collect();
            keys.into_iter()
                .filter_map(|key| sessions.remove(&key).map(|entry| (key, entry)))
                .collect()
        };
        let count = idle.len();
        for ((_, id), entry) in idle {
            shutdown(entry.session).await;
            info!("Evicted idle editing session for document {id}");
        }
        count
    }

    /// Runs `evict_idle` periodically until the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let evicted = registry.evict_idle(max_idle).await;
                if evicted > 0 {
                    debug!(evicted, "idle editing sessions closed");
                }
            }
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Waits for an in-progress command batch, then flushes pending saves.
async fn shutdown(session: Arc<Mutex<EditSession>>) {
    let autosave = session.lock().await.autosave.take();
    if let Some(autosave) = autosave {
        autosave.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::documents::store::memory::MemoryStore;
    use crate::editor::Caret;

    fn registry() -> (Arc<SessionRegistry>, Arc<MemoryStore>, Uuid, Uuid) {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let content = json!({ "blocks": [ { "type": "doc", "html": "<p>a</p>" } ] });
        let store = Arc::new(MemoryStore::with_doc(user, id, "이력서", content));
        let registry = Arc::new(SessionRegistry::new(store.clone(), AutosaveConfig::default()));
        (registry, store, user, id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_reuses_session() {
        let (registry, _store, user, id) = registry();
        let (a, b) = tokio::join!(registry.open(user, id), registry.open(user, id));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 1);
        assert_eq!(a.lock().await.user_id, user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_flushes_pending_edit() {
        let (registry, store, user, id) = registry();
        let session = registry.open(user, id).await.unwrap();
        {
            let mut session = session.lock().await;
            session.editor.set_caret(Caret::at(0, 1)).unwrap();
            session.editor.type_text("!").unwrap();
            session.push_body().await.unwrap();
        }
        assert!(store.writes().is_empty());

        assert_eq!(registry.evict_idle(Duration::ZERO).await, 1);
        assert_eq!(registry.len().await, 0);
        assert_eq!(store.writes(), vec!["content:<p>a!</p>".to_string()]);
        assert!(matches!(
            session.lock().await.push_body().await,
            Err(SessionError::Closed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_idle_sessions_evicted() {
        let (registry, _store, user, id) = registry();
        registry.open(user, id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(registry.evict_idle(Duration::from_secs(30)).await, 0);

        // Reopening counts as use.
        registry.open(user, id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(registry.evict_idle(Duration::from_secs(30)).await, 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(registry.evict_idle(Duration::from_secs(30)).await, 1);
        assert!(!registry.close(user, id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_closes_idle_sessions() {
        let (registry, _store, user, id) = registry();
        let sweeper = registry.spawn_sweeper(Duration::from_secs(60));
        registry.open(user, id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(registry.len().await, 1);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(registry.len().await, 0);
        sweeper.abort();
    }
}
