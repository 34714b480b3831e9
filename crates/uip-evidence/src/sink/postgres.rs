//! PostgreSQL evidence sink

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::EvidenceSink;
use crate::error::{EvidenceError, SinkUnavailable};
use crate::event::EvidenceEvent;

/// PostgreSQL-backed evidence store. Rows are insert-only.
#[derive(Debug, Clone)]
pub struct PostgresEvidenceSink {
    pool: PgPool,
}

impl PostgresEvidenceSink {
    /// Connect and initialize the schema.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self, EvidenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| SinkUnavailable::new("postgres", format!("connect: {e}")))?;

        let sink = Self { pool };
        sink.initialize_schema().await?;
        Ok(sink)
    }

    async fn initialize_schema(&self) -> Result<(), EvidenceError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS evidence (
                intent_id TEXT NOT NULL,
                sequence BIGINT NOT NULL,
                event_type TEXT NOT NULL,
                engine TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL,
                previous_hash TEXT NOT NULL,
                hash TEXT NOT NULL,
                data JSONB NOT NULL,
                PRIMARY KEY (intent_id, sequence)
            );
            "#,
            r#"CREATE INDEX IF NOT EXISTS evidence_timestamp ON evidence(timestamp DESC);"#,
        ];

        for stmt in statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| SinkUnavailable::new("postgres", format!("schema: {e}")))?;
        }

        Ok(())
    }
}

#[async_trait]
impl EvidenceSink for PostgresEvidenceSink {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn append(&self, event: &EvidenceEvent) -> Result<(), SinkUnavailable> {
        let data = serde_json::to_value(event)
            .map_err(|e| SinkUnavailable::new(self.name(), format!("encode: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO evidence (intent_id, sequence, event_type, engine, timestamp, previous_hash, hash, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.intent_id.as_str())
        .bind(event.sequence as i64)
        .bind(event.event_type.as_str())
        .bind(event.engine.as_str())
        .bind(event.timestamp)
        .bind(&event.previous_hash)
        .bind(&event.hash)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| SinkUnavailable::new(self.name(), e.to_string()))?;

        Ok(())
    }
}
