use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::SinkUnavailable;
use crate::event::{ChainHead, EventDraft, EvidenceEvent};
use crate::sink::EvidenceSink;

/// Evidence emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Upper bound on one sink append (ms)
    pub append_timeout_ms: u64,
    pub sink: SinkConfig,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            append_timeout_ms: 2000,
            sink: SinkConfig::Memory,
        }
    }
}

impl EvidenceConfig {
    pub fn append_timeout(&self) -> Duration {
        Duration::from_millis(self.append_timeout_ms)
    }
}

/// Which sink backend to construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    Memory,
    Jsonl {
        path: String,
    },
    Postgres {
        url: String,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        #[serde(default = "default_connect_timeout_secs")]
        connect_timeout_secs: u64,
    },
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Delivery counters for the evidence trail.
#[derive(Debug, Default)]
pub struct EmitterMetrics {
    emitted: AtomicU64,
    accepted: AtomicU64,
    sink_failures: AtomicU64,
    timeouts: AtomicU64,
}

/// Point-in-time copy of [`EmitterMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitterMetricsSnapshot {
    pub emitted: u64,
    pub accepted: u64,
    pub sink_failures: u64,
    pub timeouts: u64,
}

impl EmitterMetrics {
    pub fn snapshot(&self) -> EmitterMetricsSnapshot {
        EmitterMetricsSnapshot {
            emitted: self.emitted.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Seals drafts into per-intent chains and hands them to the sink.
pub struct EvidenceEmitter {
    sink: Arc<dyn EvidenceSink>,
    append_timeout: Duration,
    metrics: EmitterMetrics,
}

impl EvidenceEmitter {
    pub fn new(sink: Arc<dyn EvidenceSink>, config: &EvidenceConfig) -> Self {
        Self {
            sink,
            append_timeout: config.append_timeout(),
            metrics: EmitterMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &EmitterMetrics {
        &self.metrics
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Append one sealed event, bounded by the configured timeout.
    pub async fn emit(&self, event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        self.metrics.emitted.fetch_add(1, Ordering::Relaxed);

        let result = match tokio::time::timeout(self.append_timeout, self.sink.append(event)).await
        {
            Ok(result) => result,
            Err(_) => {
                self.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(SinkUnavailable::new(
                    self.sink.name(),
                    // A write already handed to the OS is not cancelled
                    format!(
                        "append timed out after {}ms; the event may still be persisted",
                        self.append_timeout.as_millis()
                    ),
                ))
            }
        };

        match &result {
            Ok(()) => {
                self.metrics.accepted.fetch_add(1, Ordering::Relaxed);
                debug!(
                    intent_id = %event.intent_id,
                    event_type = %event.event_type,
                    sequence = event.sequence,
                    "Evidence emitted"
                );
            }
            Err(e) => {
                self.metrics.sink_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    intent_id = %event.intent_id,
                    event_type = %event.event_type,
                    sequence = event.sequence,
                    sink = %e.sink,
                    reason = %e.reason,
                    "Evidence sink append not confirmed; audit event may be missing"
                );
            }
        }
        result
    }

    /// Seal `draft` after `head` and emit it.
    ///
    /// Sink failures are surfaced through logs and metrics only. The sealed
    /// event is returned either way and the head still advances, so a lost
    /// event shows up as a gap when the persisted chain is verified.
    pub async fn record(&self, head: &mut ChainHead, draft: EventDraft) -> EvidenceEvent {
        let event = draft.seal(head);
        let _ = self.emit(&event).await;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Engine, EventType};
    use crate::mocks::{FailingEvidenceSink, StalledEvidenceSink};
    use crate::sink::MemoryEvidenceSink;
    use uip_types::{ActorId, IntentId, TenantId};

    fn draft() -> EventDraft {
        EvidenceEvent::draft(
            EventType::IntentReceived,
            Engine::IntentEngine,
            IntentId::new("i-1"),
            ActorId::new("a"),
            TenantId::new("t"),
        )
    }

    #[tokio::test]
    async fn accepted_events_reach_the_sink() {
        let sink = MemoryEvidenceSink::new();
        let emitter = EvidenceEmitter::new(Arc::new(sink.clone()), &EvidenceConfig::default());
        let mut head = ChainHead::genesis();

        let event = emitter.record(&mut head, draft()).await;

        assert_eq!(sink.events().await, vec![event]);
        let metrics = emitter.metrics().snapshot();
        assert_eq!(metrics.accepted, 1);
        assert_eq!(metrics.sink_failures, 0);
    }

    #[tokio::test]
    async fn sink_failure_is_counted_not_propagated() {
        let emitter = EvidenceEmitter::new(
            Arc::new(FailingEvidenceSink::new("disk full")),
            &EvidenceConfig::default(),
        );
        let mut head = ChainHead::genesis();

        let event = emitter.record(&mut head, draft()).await;

        assert_eq!(event.sequence, 1);
        assert_eq!(head.sequence, 1);
        assert_eq!(emitter.metrics().snapshot().sink_failures, 1);
        assert!(emitter.emit(&event).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_sink_times_out() {
        let config = EvidenceConfig {
            append_timeout_ms: 50,
            ..Default::default()
        };
        let emitter = EvidenceEmitter::new(Arc::new(StalledEvidenceSink), &config);
        let mut head = ChainHead::genesis();
        let event = draft().seal(&mut head);

        let err = emitter.emit(&event).await.unwrap_err();

        assert!(err.reason.contains("timed out"));
        assert!(err.reason.contains("may still be persisted"));
        let metrics = emitter.metrics().snapshot();
        assert_eq!(metrics.timeouts, 1);
        assert_eq!(metrics.sink_failures, 1);
    }

    #[test]
    fn sink_config_is_tagged() {
        let config: SinkConfig =
            serde_json::from_str(r#"{"kind":"jsonl","path":"/var/log/uip/evidence.jsonl"}"#)
                .unwrap();
        assert_eq!(
            config,
            SinkConfig::Jsonl {
                path: "/var/log/uip/evidence.jsonl".into()
            }
        );
    }
}
