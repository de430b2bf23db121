//! Durable event log (outbox) with monotonically increasing sequence numbers.

use rusqlite::{params, Connection, Row};

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{HazardEvent, HazardEventKind};

use super::{fmt_ts, parse_ts};
use crate::{corrupt_row, to_storage_err};

const TABLE: &str = "event_log";

/// Append an event and return its sequence. Re-appending the same
/// `event_id` is a no-op that returns the original sequence.
pub fn append_event(conn: &Connection, event: &HazardEvent) -> TideguardResult<u64> {
    let payload =
        serde_json::to_string(&event.payload).map_err(|e| to_storage_err(e.to_string()))?;
    let inserted = conn
        .execute(
            "INSERT INTO event_log (event_id, kind, subject_id, version, occurred_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(event_id) DO NOTHING",
            params![
                event.event_id,
                event.kind.as_str(),
                event.subject_id,
                event.version as i64,
                fmt_ts(&event.occurred_at),
                payload,
            ],
        )
        .map_err(|e| to_storage_err(format!("append event {}: {e}", event.event_id)))?;
    if inserted == 1 {
        return Ok(conn.last_insert_rowid() as u64);
    }
    conn.query_row(
        "SELECT sequence FROM event_log WHERE event_id = ?1",
        params![event.event_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|seq| seq as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Up to `limit` events with `sequence > after_sequence`, in order.
pub fn events_since(
    conn: &Connection,
    after_sequence: u64,
    limit: usize,
) -> TideguardResult<Vec<HazardEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT sequence, event_id, kind, subject_id, version, occurred_at, payload
             FROM event_log
             WHERE sequence > ?1
             ORDER BY sequence
             LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![after_sequence as i64, limit as i64], EventRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(EventRow::into_event).collect()
}

struct EventRow {
    sequence: i64,
    event_id: String,
    kind: String,
    subject_id: String,
    version: i64,
    occurred_at: String,
    payload: String,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            sequence: row.get(0)?,
            event_id: row.get(1)?,
            kind: row.get(2)?,
            subject_id: row.get(3)?,
            version: row.get(4)?,
            occurred_at: row.get(5)?,
            payload: row.get(6)?,
        })
    }

    fn into_event(self) -> TideguardResult<HazardEvent> {
        let kind: HazardEventKind = self
            .kind
            .parse()
            .map_err(|e| corrupt_row(TABLE, format!("event {}: {e}", self.event_id)))?;
        let payload = serde_json::from_str(&self.payload)
            .map_err(|e| corrupt_row(TABLE, format!("event {} payload: {e}", self.event_id)))?;
        Ok(HazardEvent {
            sequence: Some(self.sequence as u64),
            occurred_at: parse_ts(TABLE, &self.occurred_at)?,
            event_id: self.event_id,
            kind,
            subject_id: self.subject_id,
            version: self.version as u64,
            payload,
        })
    }
}
