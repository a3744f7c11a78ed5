//! Minimal Chrome DevTools Protocol session.
//!
//! Attaches to an already-running browser's remote-debugging endpoint and
//! evaluates JavaScript in one tab. The protocol surface is deliberately a
//! single `evaluate` call; everything page-specific lives in the scraper.

use anyhow::{anyhow, bail, Context, Result};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

const EVALUATE_TIMEOUT: Duration = Duration::from_secs(15);

/// One debuggable target reported by `/json/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageTarget {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "type", default)]
    pub target_type: String,

    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

/// A live websocket session against one browser tab.
pub struct DevToolsSession {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl DevToolsSession {
    /// List the debuggable targets exposed at `base_url`
    /// (e.g. `http://127.0.0.1:9222`).
    pub async fn list_targets(base_url: &str) -> Result<Vec<PageTarget>> {
        let url = format!("{}/json/list", base_url.trim_end_matches('/'));

        let targets = reqwest::get(&url)
            .await
            .with_context(|| format!("Failed to reach DevTools endpoint {url}"))?
            .json::<Vec<PageTarget>>()
            .await
            .context("Failed to parse DevTools target list")?;

        Ok(targets)
    }

    /// Attach to the first page whose URL contains `url_fragment`.
    pub async fn attach(base_url: &str, url_fragment: &str) -> Result<Self> {
        let targets = Self::list_targets(base_url).await?;

        let target = targets
            .into_iter()
            .filter(|t| t.target_type == "page")
            .find(|t| t.url.contains(url_fragment))
            .ok_or_else(|| {
                anyhow!("No open tab matching {url_fragment:?}; is the session logged in?")
            })?;

        let ws_url = target
            .web_socket_debugger_url
            .ok_or_else(|| anyhow!("Target {:?} exposes no debugger URL", target.title))?;

        let (socket, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {ws_url}"))?;

        tracing::debug!("Attached to tab {:?}", target.title);

        Ok(Self { socket, next_id: 0 })
    }

    /// Evaluate a JavaScript expression in the page, returning its value.
    pub async fn evaluate(&mut self, expression: &str) -> Result<Value> {
        tokio::time::timeout(EVALUATE_TIMEOUT, self.evaluate_inner(expression))
            .await
            .map_err(|_| anyhow!("DevTools evaluate timed out after {EVALUATE_TIMEOUT:?}"))?
    }

    async fn evaluate_inner(&mut self, expression: &str) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;

        let request = json!({
            "id": id,
            "method": "Runtime.evaluate",
            "params": {
                "expression": expression,
                "returnByValue": true,
                "awaitPromise": true,
            },
        });

        self.socket
            .send(Message::Text(request.to_string()))
            .await
            .context("Failed to send evaluate request")?;

        // The socket interleaves protocol events with replies; skip frames
        // until our reply id comes back.
        loop {
            let frame = self
                .socket
                .next()
                .await
                .ok_or_else(|| anyhow!("DevTools socket closed"))?
                .context("DevTools socket error")?;

            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => bail!("DevTools socket closed by peer"),
                _ => continue,
            };

            let reply: Value = serde_json::from_str(&text).context("Invalid DevTools frame")?;
            if reply.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }

            if let Some(details) = reply.pointer("/result/exceptionDetails") {
                let description = details
                    .pointer("/exception/description")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                bail!("Page script failed: {description}");
            }

            return Ok(reply
                .pointer("/result/result/value")
                .cloned()
                .unwrap_or(Value::Null));
        }
    }

    /// Close the websocket; the browser tab itself is left untouched.
    pub async fn close(mut self) {
        let _ = self.socket.close(None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_list_parses_devtools_payload() {
        let payload = r#"[
            {
                "description": "",
                "id": "A1B2",
                "title": "WhatsApp",
                "type": "page",
                "url": "https://web.whatsapp.com/",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/A1B2"
            },
            {
                "id": "C3D4",
                "title": "service worker",
                "type": "service_worker",
                "url": "https://web.whatsapp.com/sw.js"
            }
        ]"#;

        let targets: Vec<PageTarget> = serde_json::from_str(payload).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].target_type, "page");
        assert_eq!(
            targets[0].web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/page/A1B2")
        );
        assert!(targets[1].web_socket_debugger_url.is_none());
    }
}
