//! The shared run loop: poll → dedup → emit on a fixed interval.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::emitter::{ActionFile, Emitter};
use crate::error::WatcherError;
use crate::hook::NotifyHook;
use crate::item::Item;
use crate::seen::SeenSet;

/// A polled message source.
///
/// `poll` returns the not-yet-seen items for one cycle in source order and
/// must not mutate the seen-set itself; registration happens in the driver
/// after a successful write, so a failed emission retries next cycle.
#[async_trait]
pub trait Watcher: Send {
    /// Stable source tag, used in logs and state-file names.
    fn name(&self) -> &'static str;

    async fn poll(&mut self, seen: &SeenSet) -> Result<Vec<Item>, WatcherError>;

    /// Render one item into its action-file document.
    fn render(&self, item: &Item) -> ActionFile;

    /// Release any session resources held across cycles.
    async fn shutdown(&mut self) {}
}

/// Drives one watcher until shutdown.
pub struct WatcherRuntime<W: Watcher> {
    watcher: W,
    emitter: Emitter,
    seen: SeenSet,
    check_interval: Duration,
    hook: Option<NotifyHook>,
}

impl<W: Watcher> WatcherRuntime<W> {
    pub fn new(watcher: W, emitter: Emitter, seen: SeenSet, check_interval: Duration) -> Self {
        Self {
            watcher,
            emitter,
            seen,
            check_interval,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Option<NotifyHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Run until `shutdown` resolves. Poll and emit failures are logged at
    /// the loop boundary and the loop continues with the next tick.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Starting {} watcher (interval: {:?})",
            self.watcher.name(),
            self.check_interval
        );

        let mut ticker = time::interval(self.check_interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!("{} watcher stopping", self.watcher.name());
        self.watcher.shutdown().await;
    }

    /// One poll → emit cycle. Returns the number of items emitted.
    pub async fn run_cycle(&mut self) -> usize {
        let items = match self.watcher.poll(&self.seen).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("{} poll failed: {}", self.watcher.name(), e);
                return 0;
            }
        };

        if !items.is_empty() {
            tracing::info!(
                "Found {} new items from {}",
                items.len(),
                self.watcher.name()
            );
        }

        let mut emitted = 0;
        for item in items {
            if self.seen.contains(&item.source_id) {
                continue;
            }

            let file = self.watcher.render(&item);
            match self.emitter.write(&file) {
                Ok(path) => {
                    self.seen.insert(item.source_id.clone());
                    if let Err(e) = self.seen.persist() {
                        tracing::warn!("Failed to persist seen-set: {}", e);
                    }
                    if let Some(hook) = &self.hook {
                        hook.fire(&path).await;
                    }
                    emitted += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to emit item {} from {}: {}",
                        item.source_id,
                        item.origin,
                        e
                    );
                }
            }
        }

        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Section;
    use crate::priority::Priority;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::fs;

    fn item(id: &str) -> Item {
        Item {
            source_id: id.to_string(),
            origin: "Tester".to_string(),
            body_excerpt: format!("message {id}"),
            received_at: Utc::now(),
            priority: Priority::Normal,
            extra_fields: Vec::new(),
        }
    }

    /// Returns one scripted candidate batch per poll, filtering against
    /// the seen-set the way real adapters do.
    struct ScriptedWatcher {
        batches: VecDeque<Result<Vec<Item>, WatcherError>>,
    }

    impl ScriptedWatcher {
        fn new(batches: Vec<Result<Vec<Item>, WatcherError>>) -> Self {
            Self {
                batches: batches.into(),
            }
        }
    }

    #[async_trait]
    impl Watcher for ScriptedWatcher {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn poll(&mut self, seen: &SeenSet) -> Result<Vec<Item>, WatcherError> {
            match self.batches.pop_front() {
                Some(Ok(batch)) => Ok(batch
                    .into_iter()
                    .filter(|item| !seen.contains(&item.source_id))
                    .collect()),
                Some(Err(e)) => Err(e),
                None => Ok(Vec::new()),
            }
        }

        fn render(&self, item: &Item) -> ActionFile {
            ActionFile {
                filename: format!("TEST_{}.md", item.source_id),
                kind: "test",
                received_at: item.received_at,
                priority: item.priority,
                fields: vec![("origin", item.origin.clone())],
                sections: vec![Section::new("Message", item.body_excerpt.clone())],
            }
        }
    }

    fn runtime(
        dir: &tempfile::TempDir,
        batches: Vec<Result<Vec<Item>, WatcherError>>,
    ) -> WatcherRuntime<ScriptedWatcher> {
        let emitter = Emitter::new(dir.path()).unwrap();
        WatcherRuntime::new(
            ScriptedWatcher::new(batches),
            emitter,
            SeenSet::new(100),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_seen_candidates_are_not_returned() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(&dir, vec![Ok(vec![item("A"), item("B")])]);
        rt.seen.insert("A");

        let emitted = rt.run_cycle().await;

        assert_eq!(emitted, 1);
        assert!(!dir.path().join("Inbox/TEST_A.md").exists());
        assert!(dir.path().join("Inbox/TEST_B.md").exists());
    }

    #[tokio::test]
    async fn test_emitter_invoked_at_most_once_per_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(
            &dir,
            vec![Ok(vec![item("A")]), Ok(vec![item("A")])],
        );

        assert_eq!(rt.run_cycle().await, 1);
        assert_eq!(rt.run_cycle().await, 0);
        assert_eq!(rt.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_poll_error_yields_empty_cycle_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(
            &dir,
            vec![
                Err(WatcherError::Source(anyhow::anyhow!("connection reset"))),
                Ok(vec![item("A")]),
            ],
        );

        assert_eq!(rt.run_cycle().await, 0);
        assert!(rt.seen().is_empty());

        // The next cycle proceeds normally.
        assert_eq!(rt.run_cycle().await, 1);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_item_unseen_and_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = runtime(
            &dir,
            vec![Ok(vec![item("A")]), Ok(vec![item("A")])],
        );

        // Sabotage the inbox so the first emission fails.
        let inbox = rt.emitter.inbox_dir().to_path_buf();
        fs::remove_dir(&inbox).unwrap();
        fs::write(&inbox, "not a directory").unwrap();

        assert_eq!(rt.run_cycle().await, 0);
        assert!(rt.seen().is_empty());

        // Restore the inbox; the same candidate is returned and emitted.
        fs::remove_file(&inbox).unwrap();
        fs::create_dir(&inbox).unwrap();

        assert_eq!(rt.run_cycle().await, 1);
        assert!(rt.seen().contains("A"));
        assert!(inbox.join("TEST_A.md").exists());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_signal() {
        let dir = tempfile::tempdir().unwrap();
        let rt = runtime(&dir, vec![Ok(vec![item("A")])]);

        // Resolves immediately after the first tick has had a chance.
        rt.run(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
        .await;

        assert!(dir.path().join("Inbox/TEST_A.md").exists());
    }
}
