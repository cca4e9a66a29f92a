//! Attendance ledger: one durable record per person per calendar day.
//!
//! The ledger exclusively owns its backing store. `mark` is idempotent per
//! (name, date) and runs its check-then-insert in a single transaction, so a
//! failed call never leaves a partial record and two concurrent marks cannot
//! both append for the same day.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Stored confidences are rounded to four decimal digits.
const CONFIDENCE_SCALE: f64 = 10_000.0;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger storage: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("creating ledger directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger holds a record with malformed {field}: {value}")]
    MalformedRecord { field: &'static str, value: String },
}

/// Outcome of a [`Ledger::mark`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// A new record was appended.
    Marked,
    /// A record for this name and date already existed; nothing was written.
    AlreadyMarked,
}

/// One attendance event. At most one exists per (name, date); records are
/// never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub confidence: f64,
}

/// Durable attendance store backed by SQLite.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open (or create) the ledger at `path`. The attendance table with its
    /// `{name, date, time, confidence}` columns is created on first use.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| LedgerError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// In-memory ledger, mainly for tests.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS attendance (
                 name       TEXT NOT NULL,
                 date       TEXT NOT NULL,
                 time       TEXT NOT NULL,
                 confidence REAL NOT NULL,
                 UNIQUE (name, date)
             );",
        )?;
        Ok(Self { conn })
    }

    /// Mark `name` present for the calendar day of `now`.
    ///
    /// Idempotent: a second call for the same name and day returns
    /// [`MarkOutcome::AlreadyMarked`] and leaves the first call's time and
    /// confidence untouched.
    pub fn mark(
        &mut self,
        name: &str,
        confidence: f32,
        now: NaiveDateTime,
    ) -> Result<MarkOutcome, LedgerError> {
        let date = now.date().format(DATE_FORMAT).to_string();
        let time = now.time().format(TIME_FORMAT).to_string();
        let rounded = (f64::from(confidence) * CONFIDENCE_SCALE).round() / CONFIDENCE_SCALE;

        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT rowid FROM attendance WHERE name = ?1 AND date = ?2",
                params![name, date],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            tracing::info!(name, %date, "already marked today");
            return Ok(MarkOutcome::AlreadyMarked);
        }

        tx.execute(
            "INSERT INTO attendance (name, date, time, confidence) VALUES (?1, ?2, ?3, ?4)",
            params![name, date, time, rounded],
        )?;
        tx.commit()?;
        tracing::info!(name, %date, %time, confidence = rounded, "attendance marked");
        Ok(MarkOutcome::Marked)
    }

    /// All records in insertion order.
    pub fn records(&self) -> Result<Vec<AttendanceRecord>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, date, time, confidence FROM attendance ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (name, date, time, confidence) = row?;
            records.push(AttendanceRecord {
                name,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
                confidence,
            });
        }
        Ok(records)
    }

    /// Records for one calendar day, in insertion order.
    pub fn records_for(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, LedgerError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|record| record.date == date)
            .collect())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| LedgerError::MalformedRecord {
        field: "date",
        value: value.to_string(),
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, LedgerError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| LedgerError::MalformedRecord {
        field: "time",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_fresh_ledger_is_empty() {
        let ledger = Ledger::open_in_memory().unwrap();
        assert!(ledger.records().unwrap().is_empty());
    }

    #[test]
    fn test_mark_then_already_marked_same_day() {
        let mut ledger = Ledger::open_in_memory().unwrap();

        let first = ledger.mark("Alice", 0.9, at(2025, 3, 10, 9, 0, 0)).unwrap();
        assert_eq!(first, MarkOutcome::Marked);

        // Same day, different time and confidence: no write, first values win.
        let second = ledger.mark("Alice", 0.5, at(2025, 3, 10, 14, 30, 0)).unwrap();
        assert_eq!(second, MarkOutcome::AlreadyMarked);

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(records[0].time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(records[0].confidence, 0.9);
    }

    #[test]
    fn test_cross_day_yields_two_records() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        assert_eq!(
            ledger.mark("Alice", 0.9, at(2025, 3, 10, 9, 0, 0)).unwrap(),
            MarkOutcome::Marked
        );
        assert_eq!(
            ledger.mark("Alice", 0.9, at(2025, 3, 11, 9, 0, 0)).unwrap(),
            MarkOutcome::Marked
        );
        assert_eq!(ledger.records().unwrap().len(), 2);
    }

    #[test]
    fn test_distinct_names_same_day() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.mark("Alice", 0.9, at(2025, 3, 10, 9, 0, 0)).unwrap();
        ledger.mark("Bob", 0.8, at(2025, 3, 10, 9, 0, 5)).unwrap();

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        // Insertion order preserved.
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[1].name, "Bob");
    }

    #[test]
    fn test_confidence_rounded_to_four_decimals() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.mark("Alice", 0.123456, at(2025, 3, 10, 9, 0, 0)).unwrap();
        let records = ledger.records().unwrap();
        assert_eq!(records[0].confidence, 0.1235);
    }

    #[test]
    fn test_records_for_filters_by_day() {
        let mut ledger = Ledger::open_in_memory().unwrap();
        ledger.mark("Alice", 0.9, at(2025, 3, 10, 9, 0, 0)).unwrap();
        ledger.mark("Bob", 0.8, at(2025, 3, 11, 9, 0, 0)).unwrap();

        let day = ledger
            .records_for(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap())
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].name, "Bob");
    }

    #[test]
    fn test_records_survive_reopen() {
        let path = std::env::temp_dir().join(format!(
            "rollcall-ledger-reopen-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut ledger = Ledger::open(&path).unwrap();
            ledger.mark("Alice", 0.9, at(2025, 3, 10, 9, 0, 0)).unwrap();
        }

        let reopened = Ledger::open(&path).unwrap();
        let records = reopened.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[0].confidence, 0.9);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("rollcall-ledger-dir-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("attendance.db");

        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.records().unwrap().is_empty());
        assert!(path.exists());

        drop(ledger);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
