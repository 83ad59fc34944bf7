use std::path::Path;

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{LedgerError, Result};
use crate::models::Record;
use crate::store::RecordStore;

pub const UPDATE_SUBJECT: &str = "Request for Update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn update_request(from: &str, record: &Record) -> Self {
        Self {
            from: from.to_string(),
            to: record.email.clone(),
            subject: UPDATE_SUBJECT.to_string(),
            body: format!(
                "Dear {},\n\nWe kindly request you to update your details for AlumConnect.\n\nThank you,\nAlumConnect Team",
                record.name.trim()
            ),
        }
    }

    pub fn to_rfc5322(&self) -> String {
        let body = self.body.replace('\n', "\r\n");
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}\r\n",
            self.from,
            self.to,
            self.subject,
            Utc::now().to_rfc2822(),
        )
    }
}

/// Finds the record for `name` and builds the update request for it.
#[instrument(skip(store, from))]
pub async fn request_update<S>(store: &S, name: &str, from: &str) -> Result<MailMessage>
where
    S: RecordStore + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidRequest("name is required".to_string()));
    }

    let record = store
        .find_by_name(name)
        .await?
        .ok_or_else(|| LedgerError::NotFound(name.to_string()))?;

    if record.email.trim().is_empty() {
        return Err(LedgerError::InvalidRequest(format!(
            "no email address is stored for {}",
            record.name
        )));
    }

    Ok(MailMessage::update_request(from, &record))
}

pub async fn write_outbox(message: &MailMessage, path: &Path) -> Result<()> {
    tokio::fs::write(path, message.to_rfc5322()).await?;
    info!(to = %message.to, path = %path.display(), "update request queued");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;
    use crate::models::NameMatch;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    async fn store_with_ann() -> MemoryStore {
        let store = MemoryStore::new();
        let row = json!({
            "name": "Ann Lee",
            "batch": 2019,
            "email": "ann@example.com",
            "status": "Employed",
        })
        .as_object()
        .cloned()
        .unwrap();
        ingest(&store, vec![row], NameMatch::Exact).await.unwrap();
        store
    }

    #[tokio::test]
    async fn lookup_tolerates_case_and_whitespace() {
        let store = store_with_ann().await;
        let message = request_update(&store, "  ann LEE ", "team@example.com")
            .await
            .unwrap();
        assert_eq!(message.to, "ann@example.com");
        assert_eq!(message.subject, UPDATE_SUBJECT);
        assert!(message.body.starts_with("Dear Ann Lee,"));
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let store = store_with_ann().await;
        let err = request_update(&store, "Bo Chen", "team@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = store_with_ann().await;
        let err = request_update(&store, "  ", "team@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn record_without_email_cannot_be_asked() {
        let store = MemoryStore::new();
        let row = json!({"name": "Bo Chen", "batch": 2020})
            .as_object()
            .cloned()
            .unwrap();
        ingest(&store, vec![row], NameMatch::Exact).await.unwrap();

        let err = request_update(&store, "bo chen", "team@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRequest(_)));
        assert!(err.to_string().contains("Bo Chen"));
        assert!(!err.to_string().contains("row"));
    }

    #[tokio::test]
    async fn outbox_file_carries_headers() {
        let store = store_with_ann().await;
        let message = request_update(&store, "Ann Lee", "team@example.com")
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.eml");
        write_outbox(&message, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("From: team@example.com\r\nTo: ann@example.com\r\n"));
        assert!(written.contains("Subject: Request for Update\r\n"));
        assert!(written.contains("\r\n\r\nDear Ann Lee,"));
    }
}
