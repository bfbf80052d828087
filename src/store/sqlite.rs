// 🗄️ SQLite Backend - Documents as rows + audit trail
//
// Same whole-document contract as the JSON directory, kept in one SQLite
// file. Every save also appends an event, so the history of writes can be
// inspected later.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::backend::{Document, SnapshotBackend};
use crate::error::StoreError;

/// Audit trail entry ("every save is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub document: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: &str, document: Document, data: serde_json::Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            document: document.name().to_string(),
            data,
        }
    }
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(SqliteBackend { conn })
    }

    /// Save events for a document, newest first
    pub fn events_for(&self, document: Document) -> Result<Vec<Event>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, timestamp, event_type, document, data
             FROM events
             WHERE document = ?1
             ORDER BY id DESC",
        )?;

        let rows = stmt
            .query_map(params![document.name()], |row| {
                let timestamp: String = row.get(1)?;
                let data: String = row.get(4)?;
                Ok((row.get::<_, String>(0)?, timestamp, row.get::<_, String>(2)?, row.get::<_, String>(3)?, data))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut events = Vec::with_capacity(rows.len());
        for (event_id, timestamp, event_type, document, data) in rows {
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)?.with_timezone(&Utc);
            events.push(Event {
                event_id,
                timestamp,
                event_type,
                document,
                data: serde_json::from_str(&data)?,
            });
        }

        Ok(events)
    }

    /// Append an event on `conn`, which may be an open transaction
    fn insert_event(conn: &Connection, event: &Event) -> Result<(), StoreError> {
        let data_json = serde_json::to_string(&event.data)?;

        conn.execute(
            "INSERT INTO events (event_id, timestamp, event_type, document, data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.event_id,
                event.timestamp.to_rfc3339(),
                event.event_type,
                event.document,
                data_json,
            ],
        )?;

        Ok(())
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // WAL for crash recovery (no-op for in-memory databases)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            name TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            document TEXT NOT NULL,
            data TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_document ON events(document)",
        [],
    )?;

    Ok(())
}

impl SnapshotBackend for SqliteBackend {
    fn load(&self, document: Document) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE name = ?1")?;
        let mut rows = stmt.query(params![document.name()])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, document: Document, json: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO documents (name, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![document.name(), json, Utc::now().to_rfc3339()],
        )?;

        // Document and its event land together or not at all
        let event = Event::new(
            "document_saved",
            document,
            serde_json::json!({ "bytes": json.len() }),
        );
        Self::insert_event(&tx, &event)?;
        tx.commit()?;

        Ok(())
    }

    fn kind(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_document() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        assert!(backend.load(Document::Bankrolls).unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_and_logs_events() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();

        backend.save(Document::Sessions, "[]").unwrap();
        backend.save(Document::Sessions, r#"[{"x":1}]"#).unwrap();

        assert_eq!(
            backend.load(Document::Sessions).unwrap().as_deref(),
            Some(r#"[{"x":1}]"#)
        );

        let events = backend.events_for(Document::Sessions).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "document_saved");
        assert_eq!(events[0].data["bytes"], 9);
        assert_eq!(events[1].data["bytes"], 2);

        assert!(backend.events_for(Document::Stakes).unwrap().is_empty());
    }

    #[test]
    fn test_failed_event_insert_keeps_previous_document() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.save(Document::Sessions, "[]").unwrap();

        backend.conn.execute("DROP TABLE events", []).unwrap();

        assert!(backend.save(Document::Sessions, r#"[{"x":1}]"#).is_err());
        assert_eq!(
            backend.load(Document::Sessions).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_bad_event_timestamp_is_an_error() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend
            .conn
            .execute(
                "INSERT INTO events (event_id, timestamp, event_type, document, data)
                 VALUES ('e1', 'yesterday', 'document_saved', 'stakes', '{}')",
                [],
            )
            .unwrap();

        assert!(matches!(
            backend.events_for(Document::Stakes),
            Err(StoreError::Timestamp(_))
        ));
    }

    #[test]
    fn test_file_backed_database_persists() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bankroll.db");

        {
            let mut backend = SqliteBackend::open(&path).unwrap();
            backend.save(Document::Stakes, r#"["1/3"]"#).unwrap();
        }

        let reopened = SqliteBackend::open(&path).unwrap();
        assert_eq!(
            reopened.load(Document::Stakes).unwrap().as_deref(),
            Some(r#"["1/3"]"#)
        );
    }
}
