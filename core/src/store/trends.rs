use super::{logged, SimStore};
use crate::{error::SimResult, trend::TrendPoint};
use chrono::NaiveDate;
use rusqlite::params;

impl SimStore {
    // ── Google Trends cache ───────────────────────────────────────

    /// Upsert a fetched series so later runs can read it back.
    pub fn store_trend_points(
        &self,
        keyword: &str,
        geo: &str,
        points: &[TrendPoint],
    ) -> SimResult<usize> {
        logged("store trend points", self.store_trend_points_inner(keyword, geo, points))
    }

    fn store_trend_points_inner(
        &self,
        keyword: &str,
        geo: &str,
        points: &[TrendPoint],
    ) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO google_trends (keyword, geo, date, frequency)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(keyword, geo, date) DO UPDATE SET
                    frequency = excluded.frequency",
            )?;
            for p in points {
                written += stmt.execute(params![keyword, geo, p.date.to_string(), p.frequency])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// All cached points for a keyword and region, ordered by date.
    /// Rows with an unparseable date are skipped.
    pub fn trend_points(&self, keyword: &str, geo: &str) -> SimResult<Vec<TrendPoint>> {
        let rows = logged("read trend points", self.trend_rows(keyword, geo))?;
        Ok(rows
            .into_iter()
            .filter_map(|(date, frequency)| match date.parse::<NaiveDate>() {
                Ok(date) => Some(TrendPoint::new(date, frequency)),
                Err(e) => {
                    log::warn!("store: skipping google_trends row with date '{date}': {e}");
                    None
                }
            })
            .collect())
    }

    fn trend_rows(&self, keyword: &str, geo: &str) -> rusqlite::Result<Vec<(String, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, frequency FROM google_trends
             WHERE keyword = ?1 AND geo = ?2
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![keyword, geo], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>();
        rows
    }
}
