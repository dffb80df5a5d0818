//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The generator hands rows to the store; it never executes SQL directly.
//!
//! Every storage failure is logged with context and then returned.
//! Nothing here retries.

use crate::error::{SimError, SimResult};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, ToSql};

mod roster;
mod trends;

/// Tabular rows with named columns. Used both for query results and
/// for bulk appends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One row of the `run` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub run_id: String,
    pub seed: u64,
    pub keyword: String,
    pub geo: String,
    pub trend_points: i64,
    pub original_records: i64,
    pub duplicate_records: i64,
    pub status: String,
}

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = logged(&format!("open {path}"), Connection::open(path))?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = logged("open :memory:", Connection::open_in_memory())?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        logged(
            "migrate 001_foundation",
            self.conn
                .execute_batch(include_str!("../../../migrations/001_foundation.sql")),
        )?;
        logged(
            "migrate 002_student_activities",
            self.conn
                .execute_batch(include_str!("../../../migrations/002_student_activities.sql")),
        )?;
        Ok(())
    }

    // ── Raw access ─────────────────────────────────────────────

    /// Run a parameterized statement. Returns the affected row count.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> SimResult<usize> {
        logged("execute", self.conn.execute(sql, params))
    }

    /// Run a parameterized query and collect every row.
    pub fn query(&self, sql: &str, params: &[&dyn ToSql]) -> SimResult<Table> {
        logged("query", self.query_inner(sql, params))
    }

    fn query_inner(&self, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<Table> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let rows = stmt
            .query_map(params, |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Table { columns, rows })
    }

    /// Append every row of `rows` into `table` inside one transaction.
    /// Either all rows land or none do.
    pub fn bulk_append(&self, table: &str, rows: &Table) -> SimResult<usize> {
        check_identifier(table)?;
        for column in &rows.columns {
            check_identifier(column)?;
        }
        if let Some(bad) = rows.rows.iter().find(|r| r.len() != rows.columns.len()) {
            return Err(SimError::ColumnMismatch {
                expected: rows.columns.len(),
                actual: bad.len(),
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let placeholders = (1..=rows.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            rows.columns.join(", ")
        );
        let inserted = logged(&format!("bulk append into '{table}'"), self.append_inner(&sql, rows))?;
        log::info!("store: appended {inserted} rows to {table}");
        Ok(inserted)
    }

    fn append_inner(&self, sql: &str, rows: &Table) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for row in &rows.rows {
                inserted += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Row count of a table.
    pub fn row_count(&self, table: &str) -> SimResult<i64> {
        check_identifier(table)?;
        logged(
            "row count",
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0)),
        )
    }

    /// Release the connection. Consuming `self` makes a second close
    /// impossible.
    pub fn close(self) -> SimResult<()> {
        self.conn
            .close()
            .map_err(|(_, e)| log_err("close", e))?;
        log::debug!("store: connection closed");
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        keyword: &str,
        geo: &str,
    ) -> SimResult<()> {
        logged(
            "insert run",
            self.conn.execute(
                "INSERT INTO run (run_id, seed, version, keyword, geo) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![run_id, seed as i64, version, keyword, geo],
            ),
        )?;
        Ok(())
    }

    pub fn finish_run(
        &self,
        run_id: &str,
        trend_points: usize,
        original_records: usize,
        duplicate_records: usize,
    ) -> SimResult<()> {
        logged(
            "finish run",
            self.conn.execute(
                "UPDATE run SET trend_points = ?2, original_records = ?3,
                        duplicate_records = ?4, status = 'completed'
                 WHERE run_id = ?1",
                params![
                    run_id,
                    trend_points as i64,
                    original_records as i64,
                    duplicate_records as i64
                ],
            ),
        )?;
        Ok(())
    }

    pub fn run(&self, run_id: &str) -> SimResult<Option<RunRow>> {
        logged(
            "read run",
            self.conn
                .query_row(
                    "SELECT run_id, seed, keyword, geo, trend_points, original_records,
                            duplicate_records, status
                     FROM run WHERE run_id = ?1",
                    params![run_id],
                    |row| {
                        Ok(RunRow {
                            run_id: row.get(0)?,
                            seed: row.get::<_, i64>(1)? as u64,
                            keyword: row.get(2)?,
                            geo: row.get(3)?,
                            trend_points: row.get(4)?,
                            original_records: row.get(5)?,
                            duplicate_records: row.get(6)?,
                            status: row.get(7)?,
                        })
                    },
                )
                .optional(),
        )
    }
}

/// Table and column names are spliced into SQL, so only plain
/// identifiers are accepted.
fn check_identifier(name: &str) -> SimResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SimError::InvalidIdentifier { name: name.into() })
    }
}

fn log_err(context: &str, e: rusqlite::Error) -> SimError {
    log::error!("store: failed to {context}: {e}");
    SimError::Database(e)
}

fn logged<T>(context: &str, result: rusqlite::Result<T>) -> SimResult<T> {
    result.map_err(|e| log_err(context, e))
}
