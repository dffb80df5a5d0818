//! Activity records and the dataset a run produces.

use crate::types::{AccountId, RecordId, StudentId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the persisted table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Movie,
    Quiz,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Quiz => "quiz",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: RecordId,
    /// Transient. Dropped before persistence.
    pub date: NaiveDate,
    pub student_id: StudentId,
    pub account_id: AccountId,
    pub resource_type: ResourceType,
    /// 0..=10 for quizzes, always 0 for movies.
    pub score: i64,
    /// Present only for quizzes.
    pub quiz_id: Option<i64>,
    pub last_updated_timestamp: NaiveDateTime,
}

impl ActivityRecord {
    pub fn is_quiz(&self) -> bool {
        self.resource_type == ResourceType::Quiz
    }

    pub fn is_movie(&self) -> bool {
        self.resource_type == ResourceType::Movie
    }
}

/// Every record of one run: originals first, then injected duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedDataset {
    pub records: Vec<ActivityRecord>,
    /// Number of leading records that are originals.
    pub original_count: usize,
    /// `duplicate_sources[i]` is the index of the original that
    /// `records[original_count + i]` was cloned from.
    pub duplicate_sources: Vec<usize>,
}

impl GeneratedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn originals(&self) -> &[ActivityRecord] {
        &self.records[..self.original_count]
    }

    pub fn duplicates(&self) -> &[ActivityRecord] {
        &self.records[self.original_count..]
    }

    pub fn duplicate_count(&self) -> usize {
        self.records.len() - self.original_count
    }
}
