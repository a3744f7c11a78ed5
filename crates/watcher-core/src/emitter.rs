//! Action-file rendering and emission into the vault inbox.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::WatcherError;
use crate::priority::Priority;

/// One `## `-headed free-text block in an action file body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// A rendered action file, ready to be written into the inbox.
#[derive(Debug, Clone)]
pub struct ActionFile {
    /// Final file name, e.g. `EMAIL_18c2f4a9.md`.
    pub filename: String,

    /// Fixed tag identifying the source kind (`email`, `whatsapp_message`).
    pub kind: &'static str,

    pub received_at: DateTime<Utc>,
    pub priority: Priority,

    /// Source-specific header fields, rendered after the fixed ones.
    pub fields: Vec<(&'static str, String)>,

    pub sections: Vec<Section>,
}

impl ActionFile {
    /// Render the frontmatter header and body sections.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("---\n");
        out.push_str(&format!("type: {}\n", self.kind));
        out.push_str(&format!("received: {}\n", self.received_at.to_rfc3339()));
        out.push_str("status: pending\n");
        out.push_str(&format!("priority: {}\n", self.priority.as_str()));
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, sanitize_header_value(value)));
        }
        out.push_str("---\n");

        for section in &self.sections {
            out.push('\n');
            out.push_str(&format!("## {}\n", section.heading));
            out.push_str(&section.body);
            out.push('\n');
        }

        out
    }
}

/// Header values live on single `key: value` lines; colons and line breaks
/// inside free text would corrupt them.
pub fn sanitize_header_value(value: &str) -> String {
    value
        .replace(':', ";")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Replace characters that are unsafe in file names.
pub fn sanitize_for_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' | ' ' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Writes action files into the vault's `Inbox` directory.
#[derive(Debug, Clone)]
pub struct Emitter {
    inbox_dir: PathBuf,
}

impl Emitter {
    /// Create the emitter, creating `<vault>/Inbox` if needed.
    pub fn new(vault_dir: impl AsRef<Path>) -> Result<Self, WatcherError> {
        let inbox_dir = vault_dir.as_ref().join("Inbox");
        fs::create_dir_all(&inbox_dir).map_err(|e| {
            WatcherError::init(format!(
                "cannot create inbox {}: {}",
                inbox_dir.display(),
                e
            ))
        })?;

        Ok(Self { inbox_dir })
    }

    pub fn inbox_dir(&self) -> &Path {
        &self.inbox_dir
    }

    /// Write the rendered document as a complete file (temp file + rename;
    /// the inbox never holds a partial action file).
    pub fn write(&self, file: &ActionFile) -> Result<PathBuf, WatcherError> {
        let path = self.inbox_dir.join(&file.filename);
        let tmp = self.inbox_dir.join(format!("{}.tmp", file.filename));

        fs::write(&tmp, file.render()).map_err(|e| WatcherError::ItemWrite {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &path).map_err(|e| WatcherError::ItemWrite {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!("Created action file: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> ActionFile {
        ActionFile {
            filename: "EMAIL_abc123.md".to_string(),
            kind: "email",
            received_at: "2024-05-01T10:30:00Z".parse().unwrap(),
            priority: Priority::High,
            fields: vec![
                ("from", "Jane: Doe".to_string()),
                ("subject", "Invoice overdue".to_string()),
            ],
            sections: vec![
                Section::new("Email Snippet", "Please pay the invoice."),
                Section::new("Suggested Actions", "- [ ] Review content"),
            ],
        }
    }

    #[test]
    fn test_render_header_and_sections() {
        let rendered = sample_file().render();

        assert!(rendered.starts_with("---\ntype: email\n"));
        assert!(rendered.contains("received: 2024-05-01T10:30:00+00:00\n"));
        assert!(rendered.contains("status: pending\n"));
        assert!(rendered.contains("priority: high\n"));
        assert!(rendered.contains("subject: Invoice overdue\n"));
        assert!(rendered.contains("\n## Email Snippet\nPlease pay the invoice.\n"));
        assert!(rendered.contains("\n## Suggested Actions\n- [ ] Review content\n"));
    }

    #[test]
    fn test_header_colons_are_replaced() {
        let rendered = sample_file().render();

        assert!(rendered.contains("from: Jane; Doe\n"));

        // Free-text header values must keep the line-based key: value
        // syntax parseable. `received` is machine-generated RFC 3339 and
        // legitimately carries colons.
        let header: Vec<&str> = rendered
            .lines()
            .skip(1)
            .take_while(|line| *line != "---")
            .collect();
        for line in header {
            let (key, value) = line.split_once(": ").unwrap_or((line, ""));
            if key == "received" {
                continue;
            }
            assert!(!value.contains(':'), "unescaped colon in {line:?}");
        }
    }

    #[test]
    fn test_sanitize_header_value_strips_line_breaks() {
        assert_eq!(sanitize_header_value("a\r\nb: c"), "a  b; c");
    }

    #[test]
    fn test_sanitize_for_filename() {
        assert_eq!(
            sanitize_for_filename("a/b:c d?e"),
            "a_b_c_d_e".to_string()
        );
    }

    #[test]
    fn test_write_creates_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = Emitter::new(dir.path()).unwrap();
        let file = sample_file();

        let path = emitter.write(&file).unwrap();

        assert_eq!(path, dir.path().join("Inbox/EMAIL_abc123.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), file.render());
        assert!(!dir.path().join("Inbox/EMAIL_abc123.md.tmp").exists());
    }

    #[test]
    fn test_write_is_idempotent_for_same_filename() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = Emitter::new(dir.path()).unwrap();
        let file = sample_file();

        let first = emitter.write(&file).unwrap();
        let second = emitter.write(&file).unwrap();

        assert_eq!(first, second);
        let entries: Vec<_> = fs::read_dir(emitter.inbox_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_failure_reports_item_write() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = Emitter::new(dir.path()).unwrap();

        // Replace the inbox directory with a plain file so writes fail.
        fs::remove_dir(emitter.inbox_dir()).unwrap();
        fs::write(emitter.inbox_dir(), "not a directory").unwrap();

        let err = emitter.write(&sample_file()).unwrap_err();
        assert!(matches!(err, WatcherError::ItemWrite { .. }));
    }
}
