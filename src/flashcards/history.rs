//! Mature review outcome log
//!
//! Only reviews of cards with an interval of at least one day are logged.
//! The log is append-only and is only ever read in aggregate, to compute
//! retention rates.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};

use super::models::{Outcome, ReviewOutcomeRecord};
use super::storage::Result;
use super::store::ReviewHistoryStore;

const HISTORY_FIELDS: [&str; 2] = ["Outcome", "Date"];

/// Outcome log backed by an append-only CSV file
pub struct CsvReviewHistory {
    path: PathBuf,
}

impl CsvReviewHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Log at `reviews.csv` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("reviews.csv"))
    }

    /// Read every logged outcome, oldest first
    pub fn list_records(&self) -> Result<Vec<ReviewOutcomeRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }
        Ok(records)
    }
}

impl ReviewHistoryStore for CsvReviewHistory {
    fn record(&self, outcome: Outcome, date: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(HISTORY_FIELDS)?;
        }
        writer.serialize(ReviewOutcomeRecord::new(outcome, date))?;
        writer.flush()?;

        log::debug!("Logged {:?} mature review on {}", outcome, date);
        Ok(())
    }

    fn retention_rate(&self, since_days: Option<u32>, today: NaiveDate) -> Result<Option<f64>> {
        // A window reaching past the calendar's start covers every record
        let cut_off = since_days.and_then(|days| today.checked_sub_signed(Duration::days(days as i64)));
        let records = self.list_records()?;
        Ok(retention_rate(&records, cut_off))
    }
}

/// Percentage of correct outcomes among records dated after `cut_off`
pub fn retention_rate(records: &[ReviewOutcomeRecord], cut_off: Option<NaiveDate>) -> Option<f64> {
    let in_range = records
        .iter()
        .filter(|r| cut_off.map_or(true, |c| r.date > c));

    let (mut correct, mut total) = (0usize, 0usize);
    for record in in_range {
        total += 1;
        if record.outcome == Outcome::Correct {
            correct += 1;
        }
    }

    if total == 0 {
        return None;
    }
    Some(correct as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_history() -> (CsvReviewHistory, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let history = CsvReviewHistory::in_dir(temp_dir.path());
        (history, temp_dir)
    }

    #[test]
    fn test_empty_history_is_undefined() {
        let (history, _temp) = create_test_history();
        assert_eq!(history.retention_rate(None, day(2024, 6, 1)).unwrap(), None);
        assert_eq!(history.retention_rate(Some(30), day(2024, 6, 1)).unwrap(), None);
    }

    #[test]
    fn test_all_again_is_zero_not_undefined() {
        let (history, _temp) = create_test_history();
        history.record_again(day(2024, 6, 1)).unwrap();

        assert_eq!(history.retention_rate(None, day(2024, 6, 1)).unwrap(), Some(0.0));
    }

    #[test]
    fn test_retention_rate_all_time() {
        let (history, _temp) = create_test_history();
        history.record_correct(day(2024, 1, 1)).unwrap();
        history.record_correct(day(2024, 5, 1)).unwrap();
        history.record_correct(day(2024, 5, 2)).unwrap();
        history.record_again(day(2024, 5, 3)).unwrap();

        assert_eq!(history.retention_rate(None, day(2024, 6, 1)).unwrap(), Some(75.0));
        assert_eq!(history.list_records().unwrap().len(), 4);
    }

    #[test]
    fn test_window_excludes_cut_off_day() {
        let (history, _temp) = create_test_history();
        let today = day(2024, 6, 30);
        // Exactly 30 days ago: outside the window
        history.record_again(day(2024, 5, 31)).unwrap();
        history.record_correct(day(2024, 6, 1)).unwrap();
        history.record_correct(today).unwrap();

        assert_eq!(history.retention_rate(Some(30), today).unwrap(), Some(100.0));
        let all = history.retention_rate(None, today).unwrap().unwrap();
        assert!((all - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_window_counts_every_record() {
        let (history, _temp) = create_test_history();
        history.record_correct(day(1990, 1, 1)).unwrap();
        history.record_again(day(2024, 5, 30)).unwrap();

        assert_eq!(history.retention_rate(Some(100_000_000), day(2024, 6, 1)).unwrap(), Some(50.0));
        assert_eq!(history.retention_rate(Some(u32::MAX), day(2024, 6, 1)).unwrap(), Some(50.0));
    }

    #[test]
    fn test_log_is_appended_with_single_header() {
        let (history, temp) = create_test_history();
        history.record_correct(day(2024, 6, 1)).unwrap();
        history.record_again(day(2024, 6, 2)).unwrap();

        let content = fs::read_to_string(temp.path().join("reviews.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["Outcome,Date", "correct,2024-06-01", "again,2024-06-02"]);
    }
}
