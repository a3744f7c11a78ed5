//! Gmail API client for listing and summarizing candidate messages.

use anyhow::{Context, Result};
use google_gmail1::api::Message;
use google_gmail1::hyper_rustls::HttpsConnector;
use google_gmail1::Gmail;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::path::Path;

/// Client for interacting with the Gmail API
pub struct GmailClient {
    hub: Gmail<HttpsConnector<HttpConnector>>,
}

/// Header-level summary of one candidate message
#[derive(Debug, Clone)]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub snippet: String,
}

impl GmailClient {
    /// Create a new Gmail client from an authorized-user credentials file
    pub async fn from_credentials_file(path: &Path) -> Result<Self> {
        // Use the yup_oauth2 re-exported by google_gmail1 to avoid version
        // mismatch with the hub's auth traits.
        let secret = google_gmail1::yup_oauth2::read_authorized_user_secret(path)
            .await
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;

        let auth = google_gmail1::yup_oauth2::AuthorizedUserAuthenticator::builder(secret)
            .build()
            .await
            .context("Failed to build authenticator from credentials")?;

        let connector = google_gmail1::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .context("Failed to load native TLS roots")?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = Gmail::new(client, auth);

        Ok(Self { hub })
    }

    /// List ids of up to `max_results` messages matching `query`
    pub async fn list_candidates(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        let (_, list_response) = self
            .hub
            .users()
            .messages_list("me")
            .q(query)
            .max_results(max_results)
            .doit()
            .await
            .context("Failed to list messages")?;

        let ids = list_response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        Ok(ids)
    }

    /// Fetch the From/Subject headers and snippet for one message
    pub async fn get_summary(&self, message_id: &str) -> Result<MessageSummary> {
        let (_, message) = self
            .hub
            .users()
            .messages_get("me", message_id)
            .format("metadata")
            .add_metadata_headers("Subject")
            .add_metadata_headers("From")
            .doit()
            .await
            .context("Failed to get message")?;

        Ok(Self::parse_message(message))
    }

    fn parse_message(message: Message) -> MessageSummary {
        let id = message.id.clone().unwrap_or_default();
        let snippet = message.snippet.clone().unwrap_or_default();

        let mut subject = String::new();
        let mut from = String::new();

        if let Some(payload) = &message.payload {
            if let Some(headers) = &payload.headers {
                for header in headers {
                    match header.name.as_deref() {
                        Some("Subject") => subject = header.value.clone().unwrap_or_default(),
                        Some("From") => from = header.value.clone().unwrap_or_default(),
                        _ => {}
                    }
                }
            }
        }

        MessageSummary {
            id,
            subject,
            from,
            snippet,
        }
    }
}
