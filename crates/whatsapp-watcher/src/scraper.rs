//! Chat-list scraping over the DevTools session.
//!
//! All WhatsApp Web selector knowledge lives in the injected script below;
//! when the UI changes, this file is the only place to touch.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::devtools::DevToolsSession;

/// One conversation row showing an unread badge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatRow {
    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub preview: String,

    #[serde(default)]
    pub unread_count: u32,
}

/// Injected into the page; returns a JSON array of unread chat rows.
const LIST_UNREAD_CHATS_JS: &str = r#"
(() => {
    const pane = document.querySelector('div[aria-label="Chat list"]')
        || document.querySelector('#pane-side');
    if (!pane) return JSON.stringify([]);

    const rows = pane.querySelectorAll('div[role="row"], div[role="listitem"]');
    const chats = [];

    for (const row of rows) {
        const title = row.querySelector('span[dir="auto"][title]')
            || row.querySelector('span[title]');
        const preview = row.querySelector('div[title] span, span.selectable-text span, span[dir="ltr"]');

        let unread = 0;
        const badges = row.querySelectorAll('span[aria-label*="unread"], span[role="button"] span');
        for (const badge of badges) {
            const n = parseInt((badge.textContent || '').trim(), 10);
            if (!isNaN(n) && n > 0) unread = Math.max(unread, n);
        }

        if (unread > 0) {
            chats.push({
                contact: title ? title.textContent.trim() : 'Unknown Contact',
                preview: preview ? preview.textContent.trim() : '',
                unread_count: unread,
            });
        }
    }

    return JSON.stringify(chats);
})()
"#;

/// List conversations currently showing an unread badge, in page order.
pub async fn list_unread_chats(session: &mut DevToolsSession) -> Result<Vec<ChatRow>> {
    let value = session.evaluate(LIST_UNREAD_CHATS_JS).await?;

    let payload = value
        .as_str()
        .context("Chat list script returned a non-string value")?;

    parse_chat_rows(payload)
}

fn parse_chat_rows(payload: &str) -> Result<Vec<ChatRow>> {
    serde_json::from_str(payload).context("Failed to parse chat list payload")
}
