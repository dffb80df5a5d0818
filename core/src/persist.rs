//! Handing a generated dataset to storage.

use crate::{
    activity::{ActivityRecord, GeneratedDataset, TIMESTAMP_FORMAT},
    error::SimResult,
    store::{SimStore, Table},
};
use rusqlite::types::Value;

/// Persisted column set and order. The transient `date` is not here.
pub const ACTIVITY_COLUMNS: [&str; 7] = [
    "id",
    "student_id",
    "account_id",
    "resource_type",
    "score",
    "quiz_id",
    "last_updated_timestamp",
];

/// Where generated rows end up.
pub trait ActivitySink {
    fn bulk_append(&self, table: &str, rows: &Table) -> SimResult<usize>;
}

impl ActivitySink for SimStore {
    fn bulk_append(&self, table: &str, rows: &Table) -> SimResult<usize> {
        SimStore::bulk_append(self, table, rows)
    }
}

fn to_row(record: &ActivityRecord) -> Vec<Value> {
    vec![
        Value::Integer(record.id),
        Value::Integer(record.student_id),
        Value::Integer(record.account_id),
        Value::Text(record.resource_type.as_str().to_string()),
        Value::Integer(record.score),
        record.quiz_id.map_or(Value::Null, Value::Integer),
        Value::Text(
            record
                .last_updated_timestamp
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        ),
    ]
}

/// Drop the transient date and lay records out as persisted rows.
pub fn to_table(records: &[ActivityRecord]) -> Table {
    let mut table = Table::new(&ACTIVITY_COLUMNS);
    table.rows = records.iter().map(to_row).collect();
    table
}

/// Append the dataset to `table`. An empty dataset makes no storage call.
pub fn save_activities(
    dataset: &GeneratedDataset,
    sink: &dyn ActivitySink,
    table: &str,
) -> SimResult<usize> {
    if dataset.is_empty() {
        log::info!("persist: no activities to save");
        return Ok(0);
    }
    let rows = to_table(&dataset.records);
    let saved = sink.bulk_append(table, &rows)?;
    log::info!("persist: saved {saved} activities to {table}");
    Ok(saved)
}
