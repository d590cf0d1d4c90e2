//! SQLite-based interview storage.
//!
//! Provides persistent storage for:
//! - The single active session (serialized JSON in a key-value table)
//! - Completed interview records and aggregate statistics
//!
//! Persistence is the external boundary of the engine: the active session is
//! saved after every mutating command and restored (with validation) at
//! startup. Writes are last-write-wins; the only guarantee on restore is
//! that the session is re-validated before it is resumed.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::DatabaseError;
use crate::scoring::ScoreReport;
use crate::session::{InterviewSession, SessionStatus};

const ACTIVE_SESSION_KEY: &str = "active_session";

/// One completed interview, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: i64,
    pub session_id: String,
    pub candidate: String,
    pub total_questions: u64,
    pub timed_out: u64,
    pub score: Option<u32>,
    pub passed: Option<bool>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Aggregate interview statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_interviews: u64,
    pub passed_interviews: u64,
    pub today_interviews: u64,
    pub total_timeouts: u64,
    pub average_score: Option<f64>,
}

/// SQLite database for interview storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/intervue/intervue.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("intervue.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS interviews (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id      TEXT NOT NULL,
                candidate       TEXT NOT NULL,
                total_questions INTEGER NOT NULL,
                timed_out       INTEGER NOT NULL,
                score           INTEGER,
                passed          INTEGER,
                started_at      TEXT NOT NULL,
                completed_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_interviews_completed_at ON interviews(completed_at);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Active session ───────────────────────────────────────────────

    /// Persist the active session. Called after every mutating command.
    pub fn save_active_session(&self, session: &InterviewSession) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(session)
            .map_err(|e| DatabaseError::CorruptValue(e.to_string()))?;
        self.kv_set(ACTIVE_SESSION_KEY, &json)
    }

    pub fn clear_active_session(&self) -> Result<(), DatabaseError> {
        self.kv_delete(ACTIVE_SESSION_KEY)
    }

    /// Load, validate, and rehydrate the persisted active session.
    ///
    /// Applies the restoration validity rule: only an in-progress or paused
    /// session inside the staleness window, with a sane cursor, comes back.
    /// Anything else -- unparseable JSON, stale, completed, malformed -- is
    /// deleted and `None` returned so the caller falls back to a fresh
    /// start. The countdown is re-derived from timestamps, never trusted
    /// from the stored value.
    pub fn load_active_session(
        &self,
        now: DateTime<Utc>,
        staleness_hours: i64,
    ) -> Result<Option<InterviewSession>, DatabaseError> {
        let Some(json) = self.kv_get(ACTIVE_SESSION_KEY)? else {
            return Ok(None);
        };

        let Ok(mut session) = serde_json::from_str::<InterviewSession>(&json) else {
            self.clear_active_session()?;
            return Ok(None);
        };

        if session.validate_restorable(now, staleness_hours).is_err() {
            self.clear_active_session()?;
            return Ok(None);
        }

        session.refresh_remaining(now);
        session.timer.is_active = session.status == SessionStatus::InProgress;
        Ok(Some(session))
    }

    // ── Interview records ────────────────────────────────────────────

    /// Record a completed interview, with its score report if one exists.
    pub fn record_interview(
        &self,
        session: &InterviewSession,
        report: Option<&ScoreReport>,
    ) -> Result<i64, DatabaseError> {
        let completed_at = session.end_time.unwrap_or_else(Utc::now);
        self.conn.execute(
            "INSERT INTO interviews
                (session_id, candidate, total_questions, timed_out, score, passed,
                 started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.id,
                session.candidate_id,
                session.questions.len() as u64,
                session.timed_out_count() as u64,
                report.map(|r| r.total),
                report.map(|r| r.passed),
                session.start_time.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent interviews first.
    pub fn recent_interviews(&self, limit: u32) -> Result<Vec<InterviewRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, candidate, total_questions, timed_out, score, passed,
                    started_at, completed_at
             FROM interviews
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, u64>(4)?,
                row.get::<_, Option<u32>>(5)?,
                row.get::<_, Option<bool>>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, session_id, candidate, total_questions, timed_out, score, passed, started, completed) =
                row?;
            records.push(InterviewRecord {
                id,
                session_id,
                candidate,
                total_questions,
                timed_out,
                score,
                passed,
                started_at: parse_ts(&started)?,
                completed_at: parse_ts(&completed)?,
            });
        }
        Ok(records)
    }

    pub fn stats(&self) -> Result<Stats, DatabaseError> {
        let (total, passed, timeouts, avg): (u64, u64, u64, Option<f64>) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(passed), 0),
                        COALESCE(SUM(timed_out), 0),
                        AVG(score)
                 FROM interviews",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let today_interviews: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM interviews WHERE completed_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get(0),
        )?;

        Ok(Stats {
            total_interviews: total,
            passed_interviews: passed,
            today_interviews,
            total_timeouts: timeouts,
            average_score: avg,
        })
    }
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptValue(format!("bad timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Difficulty, Question};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn question(order: u32) -> Question {
        Question {
            id: format!("q{order}"),
            text: format!("question {order}"),
            difficulty: Difficulty::Easy,
            category: "test".into(),
            order,
        }
    }

    fn session() -> InterviewSession {
        InterviewSession::new("ava@example.com", vec![question(1), question(2)], t0()).unwrap()
    }

    #[test]
    fn kv_set_get_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.kv_get("missing").unwrap(), None);
        db.kv_set("k", "v1").unwrap();
        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
        db.kv_delete("k").unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);
    }

    #[test]
    fn active_session_roundtrip_preserves_progress() {
        let db = Database::open_in_memory().unwrap();
        let mut s = session();
        s.push_answer(crate::session::Answer {
            question_id: "q1".into(),
            text: "an answer".into(),
            time_spent_secs: 9,
            timestamp: t0() + Duration::seconds(9),
        })
        .unwrap();
        db.save_active_session(&s).unwrap();

        let restored = db
            .load_active_session(t0() + Duration::minutes(5), 24)
            .unwrap()
            .expect("session should restore");
        assert_eq!(restored.id, s.id);
        assert_eq!(restored.current_index, 1);
        assert_eq!(restored.answers.len(), 1);
        assert_eq!(restored.status, SessionStatus::InProgress);
    }

    #[test]
    fn restore_rederives_remaining_from_timestamps() {
        let db = Database::open_in_memory().unwrap();
        let mut s = session();
        // Stored countdown claims a full budget, but 12s of wall clock have
        // passed since the question started.
        s.timer.remaining_ms = 20_000;
        db.save_active_session(&s).unwrap();

        let restored = db
            .load_active_session(t0() + Duration::seconds(12), 24)
            .unwrap()
            .unwrap();
        assert_eq!(restored.timer.remaining_secs(), 8);
    }

    #[test]
    fn stale_session_is_discarded_not_resumed() {
        let db = Database::open_in_memory().unwrap();
        let mut s = session();
        s.status = SessionStatus::Paused;
        s.timer.paused_at = Some(t0() + Duration::minutes(1));
        db.save_active_session(&s).unwrap();

        let restored = db.load_active_session(t0() + Duration::hours(25), 24).unwrap();
        assert!(restored.is_none());
        // Discarded: nothing left to restore next time either.
        assert_eq!(db.kv_get(ACTIVE_SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intervue.db");

        let s = session();
        {
            let db = Database::open_at(&path).unwrap();
            db.save_active_session(&s).unwrap();
        }

        // A second connection (a later process) sees the same session.
        let db = Database::open_at(&path).unwrap();
        let restored = db
            .load_active_session(t0() + Duration::minutes(5), 24)
            .unwrap()
            .expect("session should restore from disk");
        assert_eq!(restored.id, s.id);
    }

    #[test]
    fn malformed_stored_timestamp_is_an_error_not_epoch() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO interviews
                    (session_id, candidate, total_questions, timed_out, score, passed,
                     started_at, completed_at)
                 VALUES ('s1', 'c', 2, 0, NULL, NULL, 'yesterday-ish', 'also bad')",
                [],
            )
            .unwrap();
        let err = db.recent_interviews(10);
        assert!(matches!(err, Err(DatabaseError::CorruptValue(_))));
    }

    #[test]
    fn unparseable_session_is_discarded() {
        let db = Database::open_in_memory().unwrap();
        db.kv_set(ACTIVE_SESSION_KEY, "{not json").unwrap();
        assert!(db.load_active_session(t0(), 24).unwrap().is_none());
        assert_eq!(db.kv_get(ACTIVE_SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn record_and_stats() {
        let db = Database::open_in_memory().unwrap();
        let mut s = session();
        s.status = SessionStatus::Completed;
        s.end_time = Some(Utc::now());
        s.answers.push(crate::session::Answer {
            question_id: "q1".into(),
            text: String::new(),
            time_spent_secs: 20,
            timestamp: t0(),
        });

        let report = ScoreReport {
            session_id: s.id.clone(),
            candidate_id: s.candidate_id.clone(),
            per_question: vec![],
            total: 72,
            passed: true,
            evaluated_at: Utc::now(),
        };
        db.record_interview(&s, Some(&report)).unwrap();
        db.record_interview(&s, None).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_interviews, 2);
        assert_eq!(stats.passed_interviews, 1);
        assert_eq!(stats.today_interviews, 2);
        assert_eq!(stats.total_timeouts, 2);
        assert_eq!(stats.average_score, Some(72.0));

        let recent = db.recent_interviews(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].candidate, "ava@example.com");
    }
}
