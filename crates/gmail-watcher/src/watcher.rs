//! The Gmail source: poll for unread important mail, render action files.

use async_trait::async_trait;
use chrono::Utc;
use watcher_core::{
    sanitize_for_filename, ActionFile, Item, PriorityRules, Section, SeenSet, Watcher,
    WatcherError,
};

use crate::gmail_client::{GmailClient, MessageSummary};

/// Follow-up checklist appended to every email action file.
const SUGGESTED_ACTIONS: &[&str] = &[
    "Review content and determine appropriate response",
    "Take necessary action based on email content",
    "Archive or mark as read after processing",
];

/// Classify a message summary and lift it into an [`Item`].
fn summary_to_item(rules: &PriorityRules, summary: MessageSummary) -> Item {
    let text = format!("{} {} {}", summary.subject, summary.from, summary.snippet);
    let priority = rules.classify(&text);

    let origin = if summary.from.is_empty() {
        "Unknown".to_string()
    } else {
        summary.from
    };
    let subject = if summary.subject.is_empty() {
        "No Subject".to_string()
    } else {
        summary.subject
    };

    Item {
        source_id: summary.id,
        origin,
        body_excerpt: summary.snippet,
        received_at: Utc::now(),
        priority,
        extra_fields: vec![("subject", subject)],
    }
}

/// Render one email item into its action-file document.
fn render_email(item: &Item) -> ActionFile {
    let mut fields = vec![("from", item.origin.clone())];
    fields.extend(item.extra_fields.iter().cloned());

    let checklist = SUGGESTED_ACTIONS
        .iter()
        .map(|action| format!("- [ ] {action}"))
        .collect::<Vec<_>>()
        .join("\n");

    ActionFile {
        filename: format!("EMAIL_{}.md", sanitize_for_filename(&item.source_id)),
        kind: "email",
        received_at: item.received_at,
        priority: item.priority,
        fields,
        sections: vec![
            Section::new("Email Snippet", item.body_excerpt.clone()),
            Section::new("Suggested Actions", checklist),
        ],
    }
}

pub struct GmailWatcher {
    client: GmailClient,
    query: String,
    max_results: u32,
    rules: PriorityRules,
}

impl GmailWatcher {
    pub fn new(client: GmailClient, query: String, max_results: u32) -> Self {
        Self {
            client,
            query,
            max_results,
            rules: PriorityRules::email(),
        }
    }
}

#[async_trait]
impl Watcher for GmailWatcher {
    fn name(&self) -> &'static str {
        "gmail"
    }

    async fn poll(&mut self, seen: &SeenSet) -> Result<Vec<Item>, WatcherError> {
        let ids = self
            .client
            .list_candidates(&self.query, self.max_results)
            .await?;

        let mut items = Vec::new();
        for id in ids {
            // Skip the detail fetch entirely for already-seen messages.
            if seen.contains(&id) {
                continue;
            }

            match self.client.get_summary(&id).await {
                Ok(summary) => items.push(summary_to_item(&self.rules, summary)),
                Err(e) => {
                    tracing::warn!("Failed to fetch message {}: {}", id, e);
                }
            }
        }

        Ok(items)
    }

    fn render(&self, item: &Item) -> ActionFile {
        render_email(item)
    }
}
