//! Debounced background writer for session state.
//!
//! Every state transition hands a snapshot to one writer task. Snapshots
//! arriving within the debounce window replace each other, so only the latest
//! one is written. Because all writes funnel through this task, two writes of
//! the same key can never interleave.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, warn};

use crate::models::{AppSettings, ResumeDocument, Theme};
use crate::persistence::store::KeyValueStore;
use crate::persistence::{RESUME_KEY, SETTINGS_KEY, THEME_KEY};

#[derive(Debug, Clone)]
struct Snapshot {
    document: ResumeDocument,
    settings: AppSettings,
}

enum Command {
    Save(Box<Snapshot>),
    Theme(Theme),
    Clear,
    #[cfg(test)]
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

enum Event {
    Due,
    Command(Option<Command>),
}

#[derive(Clone)]
pub struct PersistScheduler {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistScheduler {
    /// Spawns the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, debounce, rx));
        Self { tx }
    }

    /// Schedules a write of the document and settings after the debounce
    /// window, replacing any write still pending.
    pub fn schedule_save(&self, document: &ResumeDocument, settings: &AppSettings) {
        self.send(Command::Save(Box::new(Snapshot {
            document: document.clone(),
            settings: settings.clone(),
        })));
    }

    /// Theme changes are written right away.
    pub fn save_theme(&self, theme: Theme) {
        self.send(Command::Theme(theme));
    }

    /// Drops any pending write and removes the stored document and settings.
    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    /// Writes any pending snapshot now and waits until it is stored.
    #[cfg(test)]
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        self.send(Command::Flush(ack));
        let _ = done.await;
    }

    /// Flushes and stops the writer task.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        self.send(Command::Shutdown(ack));
        let _ = done.await;
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("Persistence writer has stopped; dropping request");
        }
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<Snapshot> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let event = match deadline {
            Some(at) => tokio::select! {
                _ = sleep_until(at) => Event::Due,
                command = rx.recv() => Event::Command(command),
            },
            None => Event::Command(rx.recv().await),
        };

        match event {
            Event::Due => {
                deadline = None;
                if let Some(snapshot) = pending.take() {
                    write_snapshot(store.as_ref(), &snapshot).await;
                }
            }
            Event::Command(Some(Command::Save(snapshot))) => {
                pending = Some(*snapshot);
                deadline = Some(Instant::now() + debounce);
            }
            Event::Command(Some(Command::Theme(theme))) => {
                if let Err(e) = store.set(THEME_KEY, theme.as_token()).await {
                    error!("Failed to persist theme: {e}");
                }
            }
            Event::Command(Some(Command::Clear)) => {
                pending = None;
                deadline = None;
                for key in [RESUME_KEY, SETTINGS_KEY] {
                    if let Err(e) = store.remove(key).await {
                        error!("Failed to remove '{key}': {e}");
                    }
                }
            }
            #[cfg(test)]
            Event::Command(Some(Command::Flush(ack))) => {
                deadline = None;
                if let Some(snapshot) = pending.take() {
                    write_snapshot(store.as_ref(), &snapshot).await;
                }
                let _ = ack.send(());
            }
            Event::Command(Some(Command::Shutdown(ack))) => {
                if let Some(snapshot) = pending.take() {
                    write_snapshot(store.as_ref(), &snapshot).await;
                }
                let _ = ack.send(());
                break;
            }
            Event::Command(None) => {
                if let Some(snapshot) = pending.take() {
                    write_snapshot(store.as_ref(), &snapshot).await;
                }
                break;
            }
        }
    }

    debug!("Persistence writer stopped");
}

async fn write_snapshot(store: &dyn KeyValueStore, snapshot: &Snapshot) {
    write_json(store, RESUME_KEY, &snapshot.document).await;
    write_json(store, SETTINGS_KEY, &snapshot.settings).await;
    debug!("Session state persisted");
}

async fn write_json<T: serde::Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize '{key}': {e}");
            return;
        }
    };
    if let Err(e) = store.set(key, &json).await {
        error!("Failed to persist '{key}': {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;

    const WINDOW: Duration = Duration::from_millis(3000);

    fn named(name: &str) -> ResumeDocument {
        ResumeDocument {
            name: name.to_string(),
            ..ResumeDocument::default()
        }
    }

    async fn stored_name(store: &MemoryStore) -> Option<String> {
        let raw = store.get(RESUME_KEY).await.unwrap()?;
        let doc: ResumeDocument = serde_json::from_str(&raw).unwrap();
        Some(doc.name)
    }

    fn spawn(store: &MemoryStore) -> PersistScheduler {
        PersistScheduler::spawn(Arc::new(store.clone()), WINDOW)
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_are_debounced_and_coalesced() {
        let store = MemoryStore::new();
        let scheduler = spawn(&store);
        let settings = AppSettings::default();

        scheduler.schedule_save(&named("first"), &settings);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        scheduler.schedule_save(&named("second"), &settings);

        // first deadline (t=3000) was rescheduled to t=4000
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(stored_name(&store).await, None);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(stored_name(&store).await.as_deref(), Some("second"));
        assert!(store.get(SETTINGS_KEY).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let store = MemoryStore::new();
        let scheduler = spawn(&store);

        scheduler.schedule_save(&named("now"), &AppSettings::default());
        scheduler.flush().await;
        assert_eq!(stored_name(&store).await.as_deref(), Some("now"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_write() {
        let store = MemoryStore::new();
        let scheduler = spawn(&store);

        scheduler.schedule_save(&named("last"), &AppSettings::default());
        scheduler.shutdown().await;
        assert_eq!(stored_name(&store).await.as_deref(), Some("last"));

        // writer is gone; later requests are dropped, not panics
        scheduler.schedule_save(&named("ignored"), &AppSettings::default());
        scheduler.flush().await;
        assert_eq!(stored_name(&store).await.as_deref(), Some("last"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_removes_keys_and_drops_pending() {
        let store = MemoryStore::new();
        let scheduler = spawn(&store);

        scheduler.schedule_save(&named("old"), &AppSettings::default());
        scheduler.flush().await;
        scheduler.schedule_save(&named("pending"), &AppSettings::default());
        scheduler.clear();
        scheduler.flush().await;

        assert_eq!(store.get(RESUME_KEY).await.unwrap(), None);
        assert_eq!(store.get(SETTINGS_KEY).await.unwrap(), None);

        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(store.get(RESUME_KEY).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_is_written_without_debounce() {
        let store = MemoryStore::new();
        let scheduler = spawn(&store);

        scheduler.save_theme(Theme::Dark);
        scheduler.flush().await;
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
    }
}
