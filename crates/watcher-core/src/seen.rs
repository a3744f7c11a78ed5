//! In-memory record of already-emitted item identities.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::PathBuf;

use crate::error::WatcherError;

/// Identities already emitted, bounded and optionally persisted.
///
/// Insertion order doubles as the eviction order; once `capacity` is
/// reached the oldest identity is forgotten. Callers insert only after a
/// successful emission, so a failed write leaves the identity eligible
/// for retry on the next poll cycle.
#[derive(Debug)]
pub struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    store: Option<PathBuf>,
}

impl SeenSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            store: None,
        }
    }

    /// Load from `path`, starting empty when the file is absent.
    ///
    /// A corrupt state file is logged and discarded rather than aborting
    /// startup; the cost is one replay of the current unread backlog.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, WatcherError> {
        let path = path.into();
        let mut seen = Self::new(capacity);

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(ids) => {
                    for id in ids {
                        seen.insert(id);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Ignoring corrupt seen-set store {}: {}",
                        path.display(),
                        e
                    );
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(WatcherError::State {
                    path: path.clone(),
                    source: e,
                });
            }
        }

        seen.store = Some(path);
        Ok(seen)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert an identity, evicting the oldest one beyond capacity.
    /// Returns `false` if the identity was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if !self.ids.insert(id.clone()) {
            return false;
        }

        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
        true
    }

    /// Write the current identities to the backing store, if configured.
    pub fn persist(&self) -> Result<(), WatcherError> {
        let Some(path) = &self.store else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| WatcherError::State {
                path: path.clone(),
                source: e,
            })?;
        }

        let ids: Vec<&String> = self.order.iter().collect();
        let json = serde_json::to_string_pretty(&ids).map_err(|e| WatcherError::State {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(path, json).map_err(|e| WatcherError::State {
            path: path.clone(),
            source: e,
        })?;

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
