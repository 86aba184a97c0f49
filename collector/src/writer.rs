//! # Partition Writer
//!
//! Appends metric rows to date-partitioned parquet files.
//!
//! - One file per `(partition, local date at write time)`: `<dir>/<partition>_<YYYY-MM-DD>.parquet`
//! - The date comes from the writer's clock, never from the rows
//! - Parquet files cannot be extended in place: an append reads the existing rows, writes the
//!   union to a temporary sibling and renames it over the partition file
//!
//! A single collector process is assumed; nothing guards against concurrent writers.

use crate::metrics::{
    MetricRow,
    SourceTag,
};
use arrow::{
    array::{
        Array,
        ArrayRef,
        Int64Array,
        StringArray,
    },
    datatypes::SchemaRef,
    error::ArrowError,
    record_batch::RecordBatch,
};
use chrono::{
    Local,
    NaiveDate,
};
use parquet::{
    arrow::{
        arrow_reader::ParquetRecordBatchReaderBuilder,
        ArrowWriter,
    },
    basic::{
        Compression,
        ZstdLevel,
    },
    errors::ParquetError,
    file::properties::WriterProperties,
};
use std::{
    fs::{
        self,
        File,
    },
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
    #[error("Schema of {path} does not match the metric row schema")]
    SchemaMismatch { path: PathBuf },
    #[error("Column `{0}` is missing or has an unexpected type")]
    Column(&'static str),
    #[error("Unknown source tag `{0}`")]
    UnknownSource(String),
}

#[derive(Debug, Clone)]
pub struct PartitionWriter {
    dir: PathBuf,
}

impl PartitionWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, partition: &str, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.parquet", partition, date.format("%Y-%m-%d")))
    }

    /// Appends `rows` to today's partition file and returns how many rows were written.
    ///
    /// Failures are logged and reported as `0`; the previous file content is left untouched.
    pub fn append(&self, rows: &[MetricRow], schema: &SchemaRef, partition: &str) -> usize {
        self.append_on(Local::now().date_naive(), rows, schema, partition)
    }

    pub fn append_on(&self, date: NaiveDate, rows: &[MetricRow], schema: &SchemaRef, partition: &str) -> usize {
        let path = self.partition_path(partition, date);
        match self.try_append(&path, rows, schema) {
            Ok(written) => {
                info!(path = %path.display(), "Successfully wrote {} records", written);
                written
            }
            Err(err) => {
                error!(path = %path.display(), partition, error = %err, "Error writing to parquet file");
                0
            }
        }
    }

    fn try_append(&self, path: &Path, rows: &[MetricRow], schema: &SchemaRef) -> Result<usize, WriteError> {
        if schema.fields() != MetricRow::schema().fields() {
            return Err(WriteError::SchemaMismatch {
                path: path.to_path_buf(),
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let mut all_rows = if path.exists() {
            debug!(path = %path.display(), "appending to existing partition");
            read_rows(path)?
        } else {
            fs::create_dir_all(&self.dir)?;
            Vec::new()
        };
        all_rows.extend_from_slice(rows);

        let batch = rows_to_batch(&all_rows, schema)?;
        let tmp = path.with_extension("parquet.tmp");
        let result = write_batch(&tmp, &batch).and_then(|()| fs::rename(&tmp, path).map_err(WriteError::from));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map(|()| rows.len())
    }
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<(), WriteError> {
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn rows_to_batch(rows: &[MetricRow], schema: &SchemaRef) -> Result<RecordBatch, WriteError> {
    let ids = Int64Array::from_iter_values(rows.iter().map(|row| row.id));
    let timestamps = StringArray::from_iter_values(rows.iter().map(|row| row.timestamp.as_str()));
    let counts = Int64Array::from_iter_values(rows.iter().map(|row| row.count));
    let sources = StringArray::from_iter_values(rows.iter().map(|row| row.source.to_string()));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ids),
        Arc::new(timestamps),
        Arc::new(counts),
        Arc::new(sources),
    ];
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

/// Reads every row of a partition file, in file order.
pub fn read_rows(path: &Path) -> Result<Vec<MetricRow>, WriteError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    if builder.schema().fields() != MetricRow::schema().fields() {
        return Err(WriteError::SchemaMismatch {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let ids = int64_column(&batch, "id")?;
        let timestamps = string_column(&batch, "timestamp")?;
        let counts = int64_column(&batch, "count")?;
        let sources = string_column(&batch, "source")?;

        for i in 0..batch.num_rows() {
            let source = sources.value(i);
            rows.push(MetricRow {
                id: ids.value(i),
                timestamp: timestamps.value(i).to_string(),
                count: counts.value(i),
                source: source
                    .parse::<SourceTag>()
                    .map_err(|_| WriteError::UnknownSource(source.to_string()))?,
            });
        }
    }
    Ok(rows)
}

fn int64_column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a Int64Array, WriteError> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<Int64Array>())
        .ok_or(WriteError::Column(name))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a StringArray, WriteError> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<StringArray>())
        .ok_or(WriteError::Column(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{
        DataType,
        Field,
        Schema,
    };
    use pretty_assertions::assert_eq;

    fn row(id: i64, count: i64, source: SourceTag) -> MetricRow {
        MetricRow {
            id,
            timestamp: format!("2024-05-01T00:00:{:02}.000Z", id % 60),
            count,
            source,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn fresh_date_creates_a_new_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.child("parquet"));
        let schema = MetricRow::schema();

        let first = vec![row(1, 10, SourceTag::X)];
        let second = vec![row(2, 20, SourceTag::Telegram)];
        assert_eq!(writer.append_on(date(1), &first, &schema, "metrics"), 1);
        assert_eq!(writer.append_on(date(2), &second, &schema, "metrics"), 1);

        let day_one = writer.partition_path("metrics", date(1));
        let day_two = writer.partition_path("metrics", date(2));
        assert!(day_one.ends_with("metrics_2024-05-01.parquet"));
        assert_eq!(read_rows(&day_one).unwrap(), first);
        assert_eq!(read_rows(&day_two).unwrap(), second);
    }

    #[test]
    fn same_date_appends_in_call_order() {
        let dir = temp_dir::TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path());
        let schema = MetricRow::schema();

        let first = vec![row(1, 10, SourceTag::X), row(2, 20, SourceTag::Holders)];
        let second = vec![row(3, 30, SourceTag::GithubStars), row(4, 40, SourceTag::GithubForks)];
        assert_eq!(writer.append_on(date(3), &first, &schema, "metrics"), 2);
        assert_eq!(writer.append_on(date(3), &second, &schema, "metrics"), 2);

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);

        let rows = read_rows(&writer.partition_path("metrics", date(3))).unwrap();
        assert_eq!(rows, [first, second].concat());
    }

    #[test]
    fn partitions_are_separate_files() {
        let dir = temp_dir::TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path());
        let schema = MetricRow::schema();
        writer.append_on(date(4), &[row(1, 1, SourceTag::X)], &schema, "metrics");
        writer.append_on(date(4), &[row(2, 2, SourceTag::X)], &schema, "backfill");

        assert_eq!(read_rows(&writer.partition_path("metrics", date(4))).unwrap().len(), 1);
        assert_eq!(read_rows(&writer.partition_path("backfill", date(4))).unwrap().len(), 1);
    }

    #[test]
    fn failures_are_reported_as_zero_and_keep_the_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path());
        let schema = MetricRow::schema();
        writer.append_on(date(5), &[row(1, 1, SourceTag::X)], &schema, "metrics");

        let other = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        assert_eq!(writer.append_on(date(5), &[row(2, 2, SourceTag::X)], &other, "metrics"), 0);

        let path = writer.partition_path("metrics", date(5));
        fs::write(dir.child("metrics_2024-05-06.parquet"), b"not parquet").unwrap();
        assert_eq!(writer.append_on(date(6), &[row(3, 3, SourceTag::X)], &schema, "metrics"), 0);

        assert_eq!(read_rows(&path).unwrap(), [row(1, 1, SourceTag::X)]);
        assert_eq!(
            fs::read(dir.child("metrics_2024-05-06.parquet")).unwrap(),
            b"not parquet"
        );
    }

    #[test]
    fn empty_batches_do_not_create_files() {
        let dir = temp_dir::TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path());
        assert_eq!(writer.append_on(date(7), &[], &MetricRow::schema(), "metrics"), 0);
        assert!(!writer.partition_path("metrics", date(7)).exists());
    }
}
