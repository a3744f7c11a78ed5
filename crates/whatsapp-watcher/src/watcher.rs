//! The WhatsApp Web source: scrape unread chats, render action files.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use watcher_core::{
    sanitize_for_filename, ActionFile, Item, PriorityRules, Section, SeenSet, Watcher,
    WatcherError,
};

use crate::devtools::DevToolsSession;
use crate::scraper;

/// Per-conversation identity state: the hash of the last seen preview
/// content and a monotonic message sequence number.
#[derive(Debug, Clone, Default)]
struct ConversationState {
    last_content_hash: Option<String>,
    seq: u64,
}

/// Stable message identities derived from conversation content.
///
/// A preview whose hash differs from the conversation's last one counts as
/// a new message and bumps the sequence number; an unchanged preview keeps
/// the current identity, so a failed emission retries under the same id.
#[derive(Debug, Default)]
struct IdentityTracker {
    conversations: HashMap<String, ConversationState>,
}

impl IdentityTracker {
    fn message_id(&mut self, contact: &str, preview: &str) -> String {
        let content_hash = hex_digest(preview);
        let state = self.conversations.entry(contact.to_string()).or_default();

        if state.last_content_hash.as_deref() != Some(content_hash.as_str()) {
            state.seq += 1;
            state.last_content_hash = Some(content_hash.clone());
        }

        format!(
            "{}-{}-{}",
            &hex_digest(contact)[..10],
            state.seq,
            &content_hash[..12]
        )
    }
}

fn hex_digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Render one chat item into its action-file document.
fn render_chat_message(item: &Item) -> ActionFile {
    ActionFile {
        filename: format!("WA_{}.md", sanitize_for_filename(&item.source_id)),
        kind: "whatsapp_message",
        received_at: item.received_at,
        priority: item.priority,
        fields: vec![("contact", item.origin.clone())],
        sections: vec![Section::new("Message", item.body_excerpt.clone())],
    }
}

pub struct WhatsAppWatcher {
    devtools_url: String,
    session: Option<DevToolsSession>,
    identities: IdentityTracker,
    rules: PriorityRules,
}

impl WhatsAppWatcher {
    pub fn new(devtools_url: String) -> Self {
        Self {
            devtools_url,
            session: None,
            identities: IdentityTracker::default(),
            rules: PriorityRules::chat(),
        }
    }

    /// Attach to the WhatsApp Web tab if no live session is held.
    async fn ensure_session(&mut self) -> Result<(), WatcherError> {
        if self.session.is_none() {
            let session = DevToolsSession::attach(&self.devtools_url, "web.whatsapp.com").await?;
            tracing::info!("Attached to WhatsApp Web session");
            self.session = Some(session);
        }
        Ok(())
    }
}

#[async_trait]
impl Watcher for WhatsAppWatcher {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    async fn poll(&mut self, seen: &SeenSet) -> Result<Vec<Item>, WatcherError> {
        self.ensure_session().await?;
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };

        let rows = match scraper::list_unread_chats(session).await {
            Ok(rows) => rows,
            Err(e) => {
                // Socket state is unknown after a failure; re-attach next cycle.
                self.session = None;
                return Err(WatcherError::Source(e));
            }
        };

        let mut items = Vec::new();
        for row in rows {
            let source_id = self.identities.message_id(&row.contact, &row.preview);
            if seen.contains(&source_id) {
                continue;
            }

            let priority = self.rules.classify(&row.preview);
            items.push(Item {
                source_id,
                origin: row.contact,
                body_excerpt: row.preview,
                received_at: Utc::now(),
                priority,
                extra_fields: Vec::new(),
            });
        }

        Ok(items)
    }

    fn render(&self, item: &Item) -> ActionFile {
        render_chat_message(item)
    }

    async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
            tracing::info!("Closed DevTools session");
        }
    }
}
