use super::{logged, SimStore};
use crate::{error::SimResult, types::Roster};

impl SimStore {
    // ── Roster ────────────────────────────────────────────────────

    /// Insert roster ids, ignoring ones already present.
    pub fn seed_roster(&self, roster: &Roster) -> SimResult<()> {
        logged("seed roster", self.seed_roster_inner(roster))
    }

    fn seed_roster_inner(&self, roster: &Roster) -> rusqlite::Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut students = tx.prepare("INSERT OR IGNORE INTO student (student_id) VALUES (?1)")?;
            for id in &roster.student_ids {
                students.execute([id])?;
            }
            let mut accounts = tx.prepare("INSERT OR IGNORE INTO account (account_id) VALUES (?1)")?;
            for id in &roster.account_ids {
                accounts.execute([id])?;
            }
        }
        tx.commit()
    }

    pub fn load_roster(&self) -> SimResult<Roster> {
        let student_ids = logged("load students", self.ids("SELECT student_id FROM student ORDER BY student_id"))?;
        let account_ids = logged("load accounts", self.ids("SELECT account_id FROM account ORDER BY account_id"))?;
        Ok(Roster::new(student_ids, account_ids))
    }

    fn ids(&self, sql: &str) -> rusqlite::Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>();
        ids
    }
}
