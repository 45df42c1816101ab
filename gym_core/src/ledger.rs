//! Per-user workout ledger persisted as CSV.
//!
//! The ledger is append-only. Every append rewrites the whole file so that
//! the table on disk always mirrors the in-memory sequence. Rows that fail to
//! parse stay out of the entry list but are written back untouched, in their
//! original position, on every rewrite.

use crate::storage::{self, FileLock};
use crate::{NewEntry, Result, WorkoutEntry};
use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix appended to the username to name its ledger file
pub const LEDGER_FILE_SUFFIX: &str = "_gym_weights.csv";

const HEADER: [&str; 5] = [
    "Date",
    "Exercise",
    "Weight (kg)",
    "Reps",
    "Estimated 1RM (kg)",
];

/// A row in the CSV table
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Exercise")]
    exercise: String,
    #[serde(rename = "Weight (kg)")]
    weight: f64,
    #[serde(rename = "Reps")]
    reps: u32,
    #[serde(rename = "Estimated 1RM (kg)")]
    one_rep_max: f64,
}

impl From<&WorkoutEntry> for CsvRow {
    fn from(entry: &WorkoutEntry) -> Self {
        CsvRow {
            date: entry.date.format("%Y-%m-%d").to_string(),
            exercise: entry.exercise.clone(),
            weight: entry.weight,
            reps: entry.reps,
            one_rep_max: entry.one_rep_max,
        }
    }
}

impl TryFrom<CsvRow> for WorkoutEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let date = parse_row_date(&row.date)?;

        Ok(WorkoutEntry {
            date,
            exercise: row.exercise,
            weight: row.weight,
            reps: row.reps,
            // Stored value wins; never recomputed
            one_rep_max: row.one_rep_max,
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component
fn parse_row_date(value: &str) -> Result<NaiveDate> {
    let day = value.trim().get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| crate::Error::InvalidInput(format!("Invalid date '{}': {}", value, e)))
}

/// Location of `username`'s ledger inside `data_dir`
pub fn ledger_path(data_dir: &Path, username: &str) -> PathBuf {
    data_dir.join(format!("{}{}", username, LEDGER_FILE_SUFFIX))
}

/// A data row that could not be read as an entry
#[derive(Debug, Clone)]
struct UnparsedRow {
    /// Zero-based index among all data rows in the file
    position: usize,
    record: ByteRecord,
}

/// Ordered workout history for one user
#[derive(Debug)]
pub struct Ledger {
    username: String,
    path: PathBuf,
    entries: Vec<WorkoutEntry>,
    unparsed: Vec<UnparsedRow>,
}

impl Ledger {
    /// Load `username`'s ledger from `data_dir`
    ///
    /// A missing file is an empty ledger, not an error. Rows that fail to
    /// parse are logged and left out of [`Ledger::entries`], but they are
    /// kept and written back as-is by later appends.
    pub fn load(data_dir: &Path, username: &str) -> Result<Self> {
        let path = ledger_path(data_dir, username);
        let (entries, unparsed) = read_rows(&path)?;

        tracing::debug!(
            "Loaded {} entries ({} unreadable) for '{}' from {:?}",
            entries.len(),
            unparsed.len(),
            username,
            path
        );

        Ok(Self {
            username: username.to_string(),
            path,
            entries,
            unparsed,
        })
    }

    /// Record a new set
    ///
    /// Derives the 1RM, appends the entry and rewrites the table. Identical
    /// submissions are stored as separate rows. Input is not validated here.
    pub fn append(&mut self, entry: NewEntry) -> Result<&WorkoutEntry> {
        self.entries.push(WorkoutEntry::from(entry));

        if let Err(e) = self.save() {
            self.entries.pop();
            return Err(e);
        }

        let recorded = &self.entries[self.entries.len() - 1];
        tracing::info!(
            "Logged {} {}kg x {} for '{}' (est. 1RM {}kg)",
            recorded.exercise,
            recorded.weight,
            recorded.reps,
            self.username,
            recorded.one_rep_max
        );
        Ok(recorded)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows on disk that could not be read as entries
    pub fn unparsed_count(&self) -> usize {
        self.unparsed.len()
    }

    fn save(&self) -> Result<()> {
        storage::write_atomic(&self.path, |writer| {
            let mut csv_writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(&mut *writer);

            // Header goes out explicitly so an empty table is still well-formed
            csv_writer.write_record(HEADER)?;

            let total = self.entries.len() + self.unparsed.len();
            let mut entries = self.entries.iter();
            let mut unparsed = self.unparsed.iter().peekable();
            for position in 0..total {
                match unparsed.next_if(|row| row.position == position) {
                    Some(row) => csv_writer.write_byte_record(&row.record)?,
                    None => {
                        if let Some(entry) = entries.next() {
                            csv_writer.serialize(CsvRow::from(entry))?;
                        }
                    }
                }
            }
            csv_writer.flush()?;
            Ok(())
        })
    }
}

fn read_rows(path: &Path) -> Result<(Vec<WorkoutEntry>, Vec<UnparsedRow>)> {
    if !path.exists() {
        return Ok((Vec::new(), Vec::new()));
    }

    let _lock = FileLock::shared(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.byte_headers()?.clone();

    let mut entries = Vec::new();
    let mut unparsed = Vec::new();
    for (position, result) in reader.byte_records().enumerate() {
        let record = result?;
        // +2: one for the header, one for 1-based numbering
        let line = position + 2;

        let parsed = record
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(crate::Error::from)
            .and_then(WorkoutEntry::try_from);
        match parsed {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping row {} of {:?}: {}", line, path, e);
                unparsed.push(UnparsedRow { position, record });
            }
        }
    }

    Ok((entries, unparsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate_one_rep_max;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();

        let ledger = Ledger::load(temp_dir.path(), "nobody").unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.username(), "nobody");
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_ledger_path_derived_from_username() {
        let path = ledger_path(Path::new("/data"), "alice");
        assert_eq!(path, PathBuf::from("/data/alice_gym_weights.csv"));
    }

    #[test]
    fn test_append_and_reload_preserves_order_and_fields() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();

        let sets = [
            (date(2024, 3, 2), "Bench Press", 80.0, 8),
            (date(2024, 1, 15), "Squat", 100.0, 5),
            (date(2024, 2, 1), "Deadlift", 142.5, 3),
            (date(2024, 2, 1), "Pull-up", 0.0, 12),
        ];

        let mut ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        for (d, exercise, weight, reps) in sets {
            ledger
                .append(NewEntry::new(d, exercise, weight, reps))
                .unwrap();
        }

        let reloaded = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(reloaded.len(), sets.len());
        for (entry, (d, exercise, weight, reps)) in reloaded.entries().iter().zip(sets) {
            assert_eq!(entry.date, d);
            assert_eq!(entry.exercise, exercise);
            assert_eq!(entry.weight, weight);
            assert_eq!(entry.reps, reps);
            assert_eq!(entry.one_rep_max, estimate_one_rep_max(weight, reps));
        }
        assert_eq!(reloaded.entries(), ledger.entries());
    }

    #[test]
    fn test_duplicate_entries_both_persist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::load(temp_dir.path(), "alice").unwrap();

        let set = NewEntry::new(date(2024, 1, 1), "Squat", 100.0, 5);
        ledger.append(set.clone()).unwrap();
        ledger.append(set).unwrap();

        let reloaded = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0], reloaded.entries()[1]);
    }

    #[test]
    fn test_csv_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        ledger
            .append(NewEntry::new(date(2024, 1, 1), "Squat", 100.0, 5))
            .unwrap();

        let contents = std::fs::read_to_string(ledger.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Exercise,Weight (kg),Reps,Estimated 1RM (kg)")
        );
        assert_eq!(lines.next(), Some("2024-01-01,Squat,100.0,5,116.7"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_stored_one_rep_max_is_not_recomputed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = ledger_path(temp_dir.path(), "alice");
        std::fs::write(
            &path,
            "Date,Exercise,Weight (kg),Reps,Estimated 1RM (kg)\n2023-06-01,Squat,100.0,5,120.0\n",
        )
        .unwrap();

        let ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(ledger.entries()[0].one_rep_max, 120.0);
    }

    #[test]
    fn test_per_user_ledgers_are_separate() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut alice = Ledger::load(temp_dir.path(), "alice").unwrap();
        alice
            .append(NewEntry::new(date(2024, 1, 1), "Squat", 100.0, 5))
            .unwrap();

        let bob = Ledger::load(temp_dir.path(), "bob").unwrap();
        assert!(bob.is_empty());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = ledger_path(temp_dir.path(), "alice");
        std::fs::write(
            &path,
            "Date,Exercise,Weight (kg),Reps,Estimated 1RM (kg)\n\
             2024-01-01,Squat,100.0,5,116.7\n\
             not-a-date,Squat,100.0,5,116.7\n\
             2024-01-03,Squat,heavy,5,116.7\n\
             2024-01-04 00:00:00,Bench Press,60.0,1,62.0\n",
        )
        .unwrap();

        let ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.unparsed_count(), 2);
        assert_eq!(ledger.entries()[0].date, date(2024, 1, 1));
        assert_eq!(ledger.entries()[1].date, date(2024, 1, 4));
        assert_eq!(ledger.entries()[1].exercise, "Bench Press");
    }

    #[test]
    fn test_append_keeps_unreadable_rows_in_place() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = ledger_path(temp_dir.path(), "alice");
        std::fs::write(
            &path,
            "Date,Exercise,Weight (kg),Reps,Estimated 1RM (kg)\n\
             2024-01-01,Squat,100.0,5,116.7\n\
             garbage,row\n\
             2024-01-02,Squat,lots,5,116.7\n\
             2024-01-03,Bench Press,60.0,1,62.0\n",
        )
        .unwrap();

        let mut ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        ledger
            .append(NewEntry::new(date(2024, 1, 5), "Squat", 105.0, 5))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Exercise,Weight (kg),Reps,Estimated 1RM (kg)",
                "2024-01-01,Squat,100.0,5,116.7",
                "garbage,row",
                "2024-01-02,Squat,lots,5,116.7",
                "2024-01-03,Bench Press,60.0,1,62.0",
                "2024-01-05,Squat,105.0,5,122.5",
            ]
        );

        // A second round trip changes nothing but the new row
        let mut reloaded = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.unparsed_count(), 2);
        reloaded
            .append(NewEntry::new(date(2024, 1, 6), "Squat", 100.0, 5))
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(&lines.join("\n")));
        assert_eq!(contents.lines().count(), 7);
    }

    #[test]
    fn test_exercise_names_with_commas_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::load(temp_dir.path(), "alice").unwrap();
        ledger
            .append(NewEntry::new(date(2024, 5, 5), "Row, \"Pendlay\"", 70.0, 6))
            .unwrap();

        let reloaded = Ledger::load(temp_dir.path(), "alice").unwrap();
        assert_eq!(reloaded.entries()[0].exercise, "Row, \"Pendlay\"");
    }
}
