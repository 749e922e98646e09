use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::batch::{BatchReport, Outcome};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS runs (
            id          INTEGER PRIMARY KEY,
            started_at  TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            total       INTEGER NOT NULL,
            successful  INTEGER NOT NULL,
            failed      INTEGER NOT NULL,
            skipped     INTEGER NOT NULL,
            dry_run     BOOLEAN NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attempts (
            id           INTEGER PRIMARY KEY,
            run_id       INTEGER NOT NULL REFERENCES runs(id),
            url          TEXT NOT NULL,
            slug         TEXT NOT NULL,
            status       TEXT NOT NULL CHECK(status IN ('ok','error')),
            error        TEXT,
            latency_ms   INTEGER,
            attempted_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_attempts_slug ON attempts(slug);
        CREATE INDEX IF NOT EXISTS idx_attempts_run ON attempts(run_id);
        ",
    )?;
    Ok(())
}

/// Store one finished run and all of its attempts. Returns the run id.
pub fn record_run(conn: &Connection, report: &BatchReport) -> Result<i64> {
    let s = &report.summary;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO runs (started_at, finished_at, total, successful, failed, skipped, dry_run)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            s.started_at.to_rfc3339(),
            s.finished_at.to_rfc3339(),
            s.total as i64,
            s.successful as i64,
            s.failed as i64,
            s.skipped as i64,
            s.dry_run,
        ],
    )?;
    let run_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO attempts (run_id, url, slug, status, error, latency_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for a in &report.attempts {
            let (status, error) = match &a.outcome {
                Outcome::Saved | Outcome::Extracted => ("ok", None),
                Outcome::Failed(e) => ("error", Some(e.as_str())),
            };
            stmt.execute(rusqlite::params![run_id, a.url, a.slug, status, error, a.latency_ms])?;
        }
    }
    tx.commit()?;
    Ok(run_id)
}

pub struct Stats {
    pub runs: i64,
    pub attempts_ok: i64,
    pub attempts_error: i64,
    /// Slugs whose most recent attempt failed.
    pub failing: Vec<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };
    let mut stmt = conn.prepare(
        "SELECT a.slug FROM attempts a
         WHERE a.status = 'error'
           AND a.id = (SELECT MAX(b.id) FROM attempts b WHERE b.slug = a.slug)
         ORDER BY a.slug",
    )?;
    let failing = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(Stats {
        runs: count("SELECT COUNT(*) FROM runs")?,
        attempts_ok: count("SELECT COUNT(*) FROM attempts WHERE status = 'ok'")?,
        attempts_error: count("SELECT COUNT(*) FROM attempts WHERE status = 'error'")?,
        failing,
    })
}
