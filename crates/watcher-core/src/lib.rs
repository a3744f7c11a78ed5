//! Shared poll → dedup → emit machinery for the vault watchers.
//!
//! Each source crate implements [`Watcher`] (a bounded `poll` plus a
//! per-item `render`) and hands it to [`WatcherRuntime`], which owns the
//! seen-set, the action-file [`Emitter`], and the fixed-interval run loop.

pub mod emitter;
pub mod error;
pub mod hook;
pub mod item;
pub mod priority;
pub mod runtime;
pub mod seen;

pub use emitter::{sanitize_for_filename, ActionFile, Emitter, Section};
pub use error::WatcherError;
pub use hook::NotifyHook;
pub use item::Item;
pub use priority::{Priority, PriorityRules};
pub use runtime::{Watcher, WatcherRuntime};
pub use seen::SeenSet;
