//! Export of all accumulated daily counts
//!
//! [`Exporter::rows`] walks every day partition in chronological order and
//! yields one [`ExportRow`] per (author, count) pair. Each call re-reads the
//! store from scratch. [`Exporter::write_csv`] renders the rows below the
//! `bucket_date,screen_name,daily_tweets` header.

pub mod csv;

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::partitions::{daily_prefix, decode_count};
use crate::ledger::{DayLabel, DurableStore, PartitionEntries, StoreError};

pub use self::csv::CsvWriter;

/// Header of the export table
pub const HEADER: [&str; 3] = ["bucket_date", "screen_name", "daily_tweets"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Write failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// One counter record flattened for export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub day: DayLabel,
    pub screen_name: String,
    pub daily_tweets: u16,
}

impl ExportRow {
    pub fn fields(&self) -> [String; 3] {
        [
            self.day.to_string(),
            self.screen_name.clone(),
            self.daily_tweets.to_string(),
        ]
    }
}

pub struct Exporter<'a> {
    store: &'a DurableStore,
}

impl<'a> Exporter<'a> {
    pub fn new(store: &'a DurableStore) -> Self {
        Self { store }
    }

    /// Lazy, single-pass sequence of rows over all day partitions
    pub fn rows(&self) -> std::result::Result<ExportRows<'a>, StoreError> {
        let names = self
            .store
            .view(|view| view.partitions_with_prefix(&daily_prefix()))?;

        let days: Vec<(DayLabel, String)> = names
            .into_iter()
            .filter_map(|name| match DayLabel::from_partition_name(&name) {
                Some(day) => Some((day, name)),
                None => {
                    warn!(partition = %name, "Skipping partition with unparsable day");
                    None
                }
            })
            .collect();

        debug!(partitions = days.len(), "Export partitions listed");
        Ok(ExportRows {
            store: self.store,
            days: days.into_iter(),
            current: None,
        })
    }

    /// Write the header and every row as CSV; returns the number of rows
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<usize> {
        let mut writer = CsvWriter::new(sink);
        writer.write_record(HEADER)?;

        let mut written = 0;
        for row in self.rows()? {
            writer.write_record(row?.fields())?;
            written += 1;
        }
        writer.flush()?;

        info!(rows = written, "Export complete");
        Ok(written)
    }
}

struct OpenPartition {
    day: DayLabel,
    name: String,
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

/// Iterator returned by [`Exporter::rows`]
pub struct ExportRows<'a> {
    store: &'a DurableStore,
    days: std::vec::IntoIter<(DayLabel, String)>,
    current: Option<OpenPartition>,
}

impl ExportRows<'_> {
    fn open(&self, day: DayLabel, name: String) -> std::result::Result<OpenPartition, StoreError> {
        let entries: PartitionEntries = self.store.get_partition(&name)?.unwrap_or_default();
        Ok(OpenPartition {
            day,
            name,
            entries: entries.into_iter(),
        })
    }
}

impl Iterator for ExportRows<'_> {
    type Item = std::result::Result<ExportRow, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(partition) = self.current.as_mut() {
                if let Some((key, value)) = partition.entries.next() {
                    let row = decode_count(&partition.name, &key, &value).map(|count| ExportRow {
                        day: partition.day,
                        screen_name: String::from_utf8_lossy(&key).into_owned(),
                        daily_tweets: count,
                    });
                    return Some(row);
                }
                self.current = None;
            }

            let (day, name) = self.days.next()?;
            match self.open(day, name) {
                Ok(partition) => self.current = Some(partition),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DailyCounters;
    use tempfile::TempDir;

    fn create_test_store() -> (DurableStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DurableStore::open(temp_dir.path().join("test_store")).unwrap();
        (store, temp_dir)
    }

    fn seed(store: &DurableStore, day: &str, counts: &[(&str, u16)]) {
        let mut counters = DailyCounters::load(store, day.parse().unwrap()).unwrap();
        for (author, n) in counts {
            for _ in 0..*n {
                counters.increment(author);
            }
        }
        counters.flush(store).unwrap();
    }

    fn export_to_string(store: &DurableStore) -> String {
        let mut out = Vec::new();
        Exporter::new(store).write_csv(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_store_exports_header_only() {
        let (store, _temp) = create_test_store();
        assert_eq!(
            export_to_string(&store),
            "bucket_date,screen_name,daily_tweets\n"
        );
    }

    #[test]
    fn test_rows_sorted_by_day_then_author() {
        let (store, _temp) = create_test_store();
        seed(&store, "2024-01-02", &[("bob", 1)]);
        seed(&store, "2024-01-01", &[("carol", 2), ("alice", 3)]);

        let rows: Vec<ExportRow> = Exporter::new(&store)
            .rows()
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        let flat: Vec<[String; 3]> = rows.iter().map(ExportRow::fields).collect();
        assert_eq!(
            flat,
            vec![
                ["2024-01-01".to_string(), "alice".to_string(), "3".to_string()],
                ["2024-01-01".to_string(), "carol".to_string(), "2".to_string()],
                ["2024-01-02".to_string(), "bob".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_rows_restartable() {
        let (store, _temp) = create_test_store();
        seed(&store, "2024-01-01", &[("alice", 1)]);

        let exporter = Exporter::new(&store);
        assert_eq!(exporter.rows().unwrap().count(), 1);

        seed(&store, "2024-01-01", &[("bob", 1)]);
        assert_eq!(exporter.rows().unwrap().count(), 2);
    }

    #[test]
    fn test_empty_day_partition_has_no_rows() {
        let (store, _temp) = create_test_store();
        DailyCounters::load(&store, "2024-01-01".parse().unwrap()).unwrap();
        seed(&store, "2024-01-02", &[("bob", 1)]);

        let rows: Vec<_> = Exporter::new(&store).rows().unwrap().collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_cursor_partition_not_exported() {
        let (store, _temp) = create_test_store();
        crate::ledger::CursorTracker::new(&store).save(9).unwrap();

        assert_eq!(Exporter::new(&store).rows().unwrap().count(), 0);
    }

    #[test]
    fn test_author_with_delimiter_is_quoted() {
        let (store, _temp) = create_test_store();
        seed(&store, "2024-01-01", &[("odd,name", 1)]);

        assert_eq!(
            export_to_string(&store),
            "bucket_date,screen_name,daily_tweets\n2024-01-01,\"odd,name\",1\n"
        );
    }

    #[test]
    fn test_write_failure_surfaces() {
        struct FailingSink;

        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (store, _temp) = create_test_store();
        let result = Exporter::new(&store).write_csv(FailingSink);
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
