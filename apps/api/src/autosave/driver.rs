//! Async driver that runs an `AutosaveController` against a `DocumentStore`.
//!
//! One task per open document. Edits arrive over an mpsc channel. At most one
//! write is in flight per document: due writes queue up and the next one is
//! dispatched only after the previous one completed, so the store sees them
//! in dispatch order.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::autosave::controller::{AutosaveConfig, AutosaveController, SaveRequest, SaveStatus};
use crate::autosave::metadata::MetadataDebouncer;
use crate::documents::store::DocumentStore;
use crate::models::document::{ContentEnvelope, DocumentRow, MetaField};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    Body(String),
    Title(String),
    Meta(MetaField, String),
    SaveNow,
}

#[derive(Debug, thiserror::Error)]
#[error("autosave task has stopped")]
pub struct AutosaveClosed;

pub struct AutosaveHandle {
    tx: mpsc::Sender<AutosaveEvent>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    pub async fn send(&self, event: AutosaveEvent) -> Result<(), AutosaveClosed> {
        self.tx.send(event).await.map_err(|_| AutosaveClosed)
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Closes the channel, flushes pending changes and waits for in-flight writes.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!("autosave task ended abnormally: {e}");
        }
    }
}

enum Job {
    Save(SaveRequest),
    Meta(MetaField, String),
}

enum Outcome {
    Save(SaveRequest, bool),
    Meta(MetaField, String, bool),
}

struct Target {
    store: Arc<dyn DocumentStore>,
    user_id: Uuid,
    id: Uuid,
}

impl Target {
    async fn run(&self, job: Job) -> Outcome {
        match job {
            Job::Save(request) => self.save(request).await,
            Job::Meta(field, value) => self.save_meta(field, value).await,
        }
    }

    async fn save(&self, request: SaveRequest) -> Outcome {
        let mut ok = true;
        if let Some(body) = &request.body {
            let content = ContentEnvelope::from_html(body.clone()).to_value();
            if let Err(e) = self.store.update_content(self.user_id, self.id, &content).await {
                warn!("autosave of document {} body failed: {e}", self.id);
                ok = false;
            }
        }
        if let Some(title) = request.title.as_deref().filter(|_| ok) {
            if let Err(e) = self.store.update_title(self.user_id, self.id, title).await {
                warn!("autosave of document {} title failed: {e}", self.id);
                ok = false;
            }
        }
        Outcome::Save(request, ok)
    }

    async fn save_meta(&self, field: MetaField, value: String) -> Outcome {
        let stored = Some(value.trim()).filter(|v| !v.is_empty());
        let ok = match self
            .store
            .update_metadata(self.user_id, self.id, field, stored)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("autosave of document {} {} failed: {e}", self.id, field.column());
                false
            }
        };
        Outcome::Meta(field, value, ok)
    }
}

/// Starts the autosave task for `doc`. The initial title/body/metadata of the
/// row are the saved baseline.
pub fn spawn_autosave(
    store: Arc<dyn DocumentStore>,
    doc: &DocumentRow,
    config: AutosaveConfig,
) -> AutosaveHandle {
    let body = ContentEnvelope::from_value(&doc.content).to_html();
    let controller = AutosaveController::new(config, body, doc.title.clone());
    let metadata = MetadataDebouncer::new(
        config.quiet_period,
        doc.company.as_deref(),
        doc.role.as_deref(),
    );
    let target = Arc::new(Target {
        store,
        user_id: doc.user_id,
        id: doc.id,
    });

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);
    let task = tokio::spawn(run(target, controller, metadata, rx, status_tx));

    AutosaveHandle {
        tx,
        status: status_rx,
        task,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

async fn join(task: &mut Option<JoinHandle<Outcome>>) -> Result<Outcome, JoinError> {
    match task {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

/// Collects the writes that are due now.
fn due_jobs(
    controller: &mut AutosaveController,
    metadata: &mut MetadataDebouncer,
    flush: bool,
    now: Instant,
) -> Vec<Job> {
    let (request, fields) = if flush {
        (controller.save_now(), metadata.flush())
    } else {
        (controller.poll(now), metadata.poll(now))
    };
    request
        .map(Job::Save)
        .into_iter()
        .chain(fields.into_iter().map(|(field, value)| Job::Meta(field, value)))
        .collect()
}

async fn run(
    target: Arc<Target>,
    mut controller: AutosaveController,
    mut metadata: MetadataDebouncer,
    mut rx: mpsc::Receiver<AutosaveEvent>,
    status_tx: watch::Sender<SaveStatus>,
) {
    let mut queue: VecDeque<Job> = VecDeque::new();
    let mut in_flight: Option<JoinHandle<Outcome>> = None;
    let mut flush_requested = false;

    loop {
        // Timers are not polled while a write is running; they catch up on completion.
        let wake = if in_flight.is_some() {
            None
        } else {
            earliest(controller.next_wakeup(), metadata.next_wakeup())
        };
        tokio::select! {
            event = rx.recv() => {
                let now = Instant::now();
                match event {
                    Some(AutosaveEvent::Body(html)) => controller.edit_body(html, now),
                    Some(AutosaveEvent::Title(title)) => controller.edit_title(title, now),
                    Some(AutosaveEvent::Meta(field, value)) => metadata.edit(field, value, now),
                    Some(AutosaveEvent::SaveNow) => flush_requested = true,
                    None => break,
                }
            }
            joined = join(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                match joined {
                    Ok(outcome) => apply(&mut controller, &mut metadata, outcome),
                    Err(e) => warn!("autosave write panicked: {e}"),
                }
            }
            _ = sleep_until(wake) => {}
        }

        if in_flight.is_none() {
            if queue.is_empty() {
                let flush = std::mem::take(&mut flush_requested);
                queue.extend(due_jobs(&mut controller, &mut metadata, flush, Instant::now()));
            }
            if let Some(job) = queue.pop_front() {
                let target = Arc::clone(&target);
                in_flight = Some(tokio::spawn(async move { target.run(job).await }));
            }
        }
        status_tx.send_replace(controller.status());
    }

    // Channel closed: finish the running write, then flush the rest in order.
    debug!("autosave channel closed, flushing");
    if let Some(task) = in_flight.take() {
        match task.await {
            Ok(outcome) => apply(&mut controller, &mut metadata, outcome),
            Err(e) => warn!("autosave write panicked: {e}"),
        }
    }
    queue.extend(due_jobs(&mut controller, &mut metadata, true, Instant::now()));
    for job in queue {
        let outcome = target.run(job).await;
        apply(&mut controller, &mut metadata, outcome);
    }
    status_tx.send_replace(controller.status());
}

fn apply(controller: &mut AutosaveController, metadata: &mut MetadataDebouncer, outcome: Outcome) {
    match outcome {
        Outcome::Save(request, ok) => controller.complete(&request, ok, Instant::now()),
        Outcome::Meta(field, value, ok) => {
            if ok {
                metadata.mark_saved(field, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::documents::store::memory::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, DocumentRow) {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let content = json!({ "blocks": [ { "type": "doc", "html": "<p>a</p>" } ] });
        let store = Arc::new(MemoryStore::with_doc(user, id, "제목", content));
        let row = store.docs.lock().unwrap().get(&id).cloned().unwrap();
        (store, row)
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_edits_write_once() {
        let (store, row) = setup();
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());

        handle.send(AutosaveEvent::Body("<p>ab</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.send(AutosaveEvent::Body("<p>abc</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.writes().is_empty());
        assert_eq!(handle.status(), SaveStatus::Pending);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.writes(), vec!["content:<p>abc</p>".to_string()]);
        assert_eq!(handle.status(), SaveStatus::Saved);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(handle.status(), SaveStatus::Idle);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_body_never_written() {
        let (store, row) = setup();
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());
        handle.send(AutosaveEvent::Body("<p>a</p>".into())).await.unwrap();
        handle.send(AutosaveEvent::Title("제목".into())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.shutdown().await;
        assert!(store.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_skips_debounce() {
        let (store, row) = setup();
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());
        handle.send(AutosaveEvent::Title("새 제목".into())).await.unwrap();
        handle.send(AutosaveEvent::SaveNow).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.writes(), vec!["title:새 제목".to_string()]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_error_without_retry() {
        let (store, row) = setup();
        *store.fail.lock().unwrap() = true;
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());
        handle.send(AutosaveEvent::Body("<p>b</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.status(), SaveStatus::Error);

        *store.fail.lock().unwrap() = false;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(store.writes().is_empty());
        assert_eq!(handle.status(), SaveStatus::Idle);

        handle.send(AutosaveEvent::Body("<p>bb</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.writes(), vec!["content:<p>bb</p>".to_string()]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_saved_per_field() {
        let (store, row) = setup();
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());
        handle
            .send(AutosaveEvent::Meta(MetaField::Company, "토스".into()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.writes(), vec!["company:토스".to_string()]);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_write_is_not_overtaken() {
        let (store, row) = setup();
        store
            .latencies
            .lock()
            .unwrap()
            .extend([Duration::from_secs(5), Duration::ZERO]);
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());

        handle.send(AutosaveEvent::Body("<p>b</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.status(), SaveStatus::Saving);
        handle.send(AutosaveEvent::Body("<p>c</p>".into())).await.unwrap();

        // The newer body is due at 1.8s but waits for the first write.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.writes().is_empty());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(
            store.writes(),
            vec!["content:<p>b</p>".to_string(), "content:<p>c</p>".to_string()]
        );
        let stored = store.docs.lock().unwrap().get(&row.id).cloned().unwrap();
        assert_eq!(ContentEnvelope::from_value(&stored.content).to_html(), "<p>c</p>");
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_during_write_runs_after_it() {
        let (store, row) = setup();
        store.latencies.lock().unwrap().push_back(Duration::from_secs(5));
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());

        handle.send(AutosaveEvent::Body("<p>b</p>".into())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.send(AutosaveEvent::Title("새 제목".into())).await.unwrap();
        handle.send(AutosaveEvent::SaveNow).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.writes().is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            store.writes(),
            vec!["content:<p>b</p>".to_string(), "title:새 제목".to_string()]
        );
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_edit() {
        let (store, row) = setup();
        let handle = spawn_autosave(store.clone(), &row, AutosaveConfig::default());
        handle.send(AutosaveEvent::Body("<p>z</p>".into())).await.unwrap();
        handle.shutdown().await;
        assert_eq!(store.writes(), vec!["content:<p>z</p>".to_string()]);
    }
}
