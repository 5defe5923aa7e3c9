use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thousands::Separable;
use tracing::{debug, info};

use crate::error::PlotError;

pub const LOCK_TYPE_COLUMN: &str = "LockType";
pub const THREAD_COUNT_COLUMN: &str = "ThreadCount";
pub const TIME_COLUMN: &str = "Time(ms)";

const REQUIRED_COLUMNS: [&str; 3] = [LOCK_TYPE_COLUMN, THREAD_COUNT_COLUMN, TIME_COLUMN];

/// One line of the benchmark results file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "LockType")]
    pub lock_type: String,
    #[serde(rename = "ThreadCount")]
    pub thread_count: u32,
    #[serde(rename = "Time(ms)")]
    pub time_ms: f64,
}

/// All rows of a results file, in file order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

/// The rows sharing one lock type, in file order.
#[derive(Debug, Clone)]
pub struct SeriesGroup<'a> {
    pub lock_type: &'a str,
    pub rows: Vec<&'a ResultRow>,
}

impl ResultSet {
    pub fn load(path: &Path) -> Result<Self, PlotError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PlotError::from_csv(path, e))?;

        let set = Self::from_csv(reader, path)?;
        info!(
            "loaded {} rows from {}",
            set.len().separate_with_commas(),
            path.display()
        );
        Ok(set)
    }

    /// Reads results from any source; `source` only labels errors.
    pub fn from_reader<R: io::Read>(rdr: R, source: &Path) -> Result<Self, PlotError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);
        Self::from_csv(reader, source)
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>, source: &Path) -> Result<Self, PlotError> {
        let headers = reader
            .headers()
            .map_err(|e| PlotError::from_csv(source, e))?
            .clone();

        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(PlotError::InputMalformed {
                    path: source.to_path_buf(),
                    reason: format!("missing column `{}`", column),
                });
            }
        }

        let extra: Vec<&str> = headers
            .iter()
            .filter(|h| !REQUIRED_COLUMNS.iter().any(|c| c == h))
            .collect();
        if !extra.is_empty() {
            debug!("ignoring extra columns {:?}", extra);
        }

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<ResultRow>, _>>()
            .map_err(|e| PlotError::from_csv(source, e))?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Partitions rows by lock type. Groups come out in the order each lock
    /// type first appears in the file.
    pub fn group_by_lock_type(&self) -> Vec<SeriesGroup<'_>> {
        let mut groups: Vec<SeriesGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for row in self.rows.iter() {
            let i = *index.entry(row.lock_type.as_str()).or_insert_with(|| {
                groups.push(SeriesGroup {
                    lock_type: &row.lock_type,
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[i].rows.push(row);
        }

        debug!("{} lock types", groups.len());
        groups
    }
}

impl SeriesGroup<'_> {
    /// (thread count, time) for every row, unmodified.
    pub fn points(&self) -> Vec<(u32, f64)> {
        self.rows
            .iter()
            .map(|row| (row.thread_count, row.time_ms))
            .collect()
    }

    /// One point per thread count holding the mean time of all rows with
    /// that count. Thread counts keep their first-seen order.
    pub fn mean_points(&self) -> Vec<(u32, f64)> {
        let mut sums: Vec<(u32, f64, u32)> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();

        for row in self.rows.iter() {
            let i = *index.entry(row.thread_count).or_insert_with(|| {
                sums.push((row.thread_count, 0.0, 0));
                sums.len() - 1
            });
            sums[i].1 += row.time_ms;
            sums[i].2 += 1;
        }

        sums.into_iter()
            .map(|(threads, total, n)| (threads, total / n as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> ResultSet {
        ResultSet::from_reader(data.as_bytes(), Path::new("inline.csv")).unwrap()
    }

    #[test]
    fn test_load_scenario() {
        let set = parse(
            "LockType,ThreadCount,Time(ms)\n\
             Spinlock,1,5.0\n\
             Spinlock,2,9.0\n\
             Mutex,1,6.0\n\
             Mutex,2,11.0\n",
        );

        assert_eq!(set.len(), 4);
        assert_eq!(
            set.rows[3],
            ResultRow {
                lock_type: "Mutex".to_string(),
                thread_count: 2,
                time_ms: 11.0
            }
        );
    }

    #[test]
    fn test_column_order_and_whitespace() {
        let set = parse("Time(ms), LockType ,ThreadCount\n 2.5 , Ticket, 8\n");

        assert_eq!(set.rows[0].lock_type, "Ticket");
        assert_eq!(set.rows[0].thread_count, 8);
        assert_eq!(set.rows[0].time_ms, 2.5);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let set = parse("LockType,ThreadCount,Time(ms),Runs\nMutex,4,3.0,10\n");
        assert_eq!(set.rows[0].time_ms, 3.0);
    }

    #[test]
    fn test_missing_column() {
        let err = ResultSet::from_reader(
            "LockType,Threads,Time(ms)\nMutex,1,1.0\n".as_bytes(),
            Path::new("inline.csv"),
        )
        .unwrap_err();

        match err {
            PlotError::InputMalformed { reason, .. } => assert!(reason.contains("ThreadCount")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_time() {
        let err = ResultSet::from_reader(
            "LockType,ThreadCount,Time(ms)\nMutex,1,fast\n".as_bytes(),
            Path::new("inline.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, PlotError::InputMalformed { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("lock-plot-no-such-results.csv");
        let err = ResultSet::load(&path).unwrap_err();
        assert!(matches!(err, PlotError::InputNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("lock-plot-load-{}.csv", std::process::id()));
        std::fs::write(&path, "LockType,ThreadCount,Time(ms)\nMutex,1,6.0\n").unwrap();

        let set = ResultSet::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_header_only() {
        let set = parse("LockType,ThreadCount,Time(ms)\n");
        assert!(set.is_empty());
        assert!(set.group_by_lock_type().is_empty());
    }

    #[test]
    fn test_group_first_seen_order() {
        let set = parse(
            "LockType,ThreadCount,Time(ms)\n\
             Ticket,1,1.0\n\
             Mutex,1,2.0\n\
             Ticket,2,3.0\n\
             Atomic,1,4.0\n\
             Mutex,2,5.0\n",
        );

        let groups = set.group_by_lock_type();
        let names: Vec<&str> = groups.iter().map(|g| g.lock_type).collect();
        assert_eq!(names, ["Ticket", "Mutex", "Atomic"]);

        let counts: Vec<usize> = groups.iter().map(|g| g.rows.len()).collect();
        assert_eq!(counts, [2, 2, 1]);
        assert_eq!(groups[1].points(), vec![(1, 2.0), (2, 5.0)]);
    }

    #[test]
    fn test_duplicates_kept_in_file_order() {
        let set = parse(
            "LockType,ThreadCount,Time(ms)\n\
             Mutex,2,4.0\n\
             Mutex,1,1.0\n\
             Mutex,2,6.0\n",
        );

        let groups = set.group_by_lock_type();
        assert_eq!(groups[0].points(), vec![(2, 4.0), (1, 1.0), (2, 6.0)]);
        assert_eq!(groups[0].mean_points(), vec![(2, 5.0), (1, 1.0)]);
    }
}
