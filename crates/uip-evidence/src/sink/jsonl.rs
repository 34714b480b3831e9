use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::EvidenceSink;
use crate::error::{EvidenceError, SinkUnavailable};
use crate::event::EvidenceEvent;

/// Append-only JSON-lines file. One event per line, fsynced per append.
pub struct JsonlEvidenceSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlEvidenceSink {
    /// Open (or create) the log for appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, EvidenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EvidenceSink for JsonlEvidenceSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn append(&self, event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        let mut line = serde_json::to_vec(event)
            .map_err(|e| SinkUnavailable::new(self.name(), format!("encode: {e}")))?;
        line.push(b'\n');

        // The lock keeps lines whole and in submission order
        let mut file = self.file.lock().await;
        file.write_all(&line)
            .await
            .map_err(|e| SinkUnavailable::new(self.name(), e.to_string()))?;
        file.sync_data()
            .await
            .map_err(|e| SinkUnavailable::new(self.name(), e.to_string()))?;

        debug!(
            path = %self.path.display(),
            intent_id = %event.intent_id,
            sequence = event.sequence,
            "Evidence appended"
        );
        Ok(())
    }
}

/// Read every event from a JSON-lines log. Blank lines are skipped.
pub async fn read_log(path: impl AsRef<Path>) -> Result<Vec<EvidenceEvent>, EvidenceError> {
    let contents = tokio::fs::read_to_string(path).await?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| EvidenceError::Malformed {
                line: idx + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::verify_log;
    use crate::event::{ChainHead, Engine, EventType};
    use uip_types::{ActorId, IntentId, TenantId};

    #[tokio::test]
    async fn appended_events_read_back_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("evidence.jsonl");
        let sink = JsonlEvidenceSink::open(&path).await.unwrap();

        let mut head = ChainHead::genesis();
        for event_type in [EventType::IntentReceived, EventType::IntentParsed] {
            let event = EvidenceEvent::draft(
                event_type,
                Engine::IntentEngine,
                IntentId::new("i-1"),
                ActorId::new("a"),
                TenantId::new("t"),
            )
            .seal(&mut head);
            sink.append(&event).await.unwrap();
        }

        let events = read_log(&path).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, EventType::IntentParsed);
        assert_eq!(verify_log(&events).unwrap()[0].events, 2);
    }

    #[tokio::test]
    async fn fractional_coordinates_keep_their_hash_after_reading_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.jsonl");
        let sink = JsonlEvidenceSink::open(&path).await.unwrap();

        let mut written = Vec::new();
        let mut head = ChainHead::genesis();
        for i in 0..400u32 {
            let latitude = 9.021909976466404 + f64::from(i) * 0.123456789012345;
            let longitude = 76.0 + f64::from(i) / 7.0;
            let event = EvidenceEvent::draft(
                EventType::IntentParsed,
                Engine::IntentEngine,
                IntentId::new("i-geo"),
                ActorId::new("a"),
                TenantId::new("t"),
            )
            .payload(
                "attributes",
                serde_json::json!({ "latitude": latitude, "longitude": longitude }),
            )
            .payload("score", f64::from(i) / 3.0)
            .seal(&mut head);
            sink.append(&event).await.unwrap();
            written.push(event);
        }

        let events = read_log(&path).await.unwrap();
        assert_eq!(events, written);
        assert!(events.iter().all(EvidenceEvent::verify_integrity));
        assert_eq!(verify_log(&events).unwrap()[0].events, 400);
    }

    #[tokio::test]
    async fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.jsonl");
        let mut head = ChainHead::genesis();

        for _ in 0..2 {
            let sink = JsonlEvidenceSink::open(&path).await.unwrap();
            let event = EvidenceEvent::draft(
                EventType::LifecycleTransitioned,
                Engine::Orchestrator,
                IntentId::new("i-2"),
                ActorId::new("a"),
                TenantId::new("t"),
            )
            .seal(&mut head);
            sink.append(&event).await.unwrap();
        }

        assert_eq!(read_log(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        tokio::fs::write(&path, "\n{not json}\n").await.unwrap();
        assert!(matches!(
            read_log(&path).await,
            Err(EvidenceError::Malformed { line: 2, .. })
        ));
    }
}
