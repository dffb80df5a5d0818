//! Shared primitive types used across the generator.

/// Opaque student identifier from the externally supplied roster.
pub type StudentId = i64;

/// Opaque account identifier from the externally supplied roster.
pub type AccountId = i64;

/// The account id meaning "no real account". Used for unassigned
/// students and for every injected duplicate row.
pub const SENTINEL_ACCOUNT: AccountId = 0;

/// Pseudo-unique activity row id. Collisions are accepted.
pub type RecordId = i64;

/// The canonical run identifier.
pub type RunId = String;

/// The student and account identifiers for one generation run.
/// Supplied whole and never changed during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub student_ids: Vec<StudentId>,
    pub account_ids: Vec<AccountId>,
}

impl Roster {
    pub fn new(student_ids: Vec<StudentId>, account_ids: Vec<AccountId>) -> Self {
        Self { student_ids, account_ids }
    }

    /// Students numbered 1..=students, accounts numbered 1001..=1000+accounts.
    pub fn sequential(students: usize, accounts: usize) -> Self {
        Self {
            student_ids: (1..=students as i64).collect(),
            account_ids: (1..=accounts as i64).map(|a| 1000 + a).collect(),
        }
    }
}
