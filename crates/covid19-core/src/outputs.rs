use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::loader::FileDigest;
use crate::table::PivotTable;
use crate::types::{GlobalAggregate, Metric, StandardizedRecord};

pub const ENRICHED_CSV: &str = "covid-all.csv";
pub const ENRICHED_PARQUET: &str = "covid-all.parquet";
pub const AGGREGATE_JSON: &str = "aggregate.json";
pub const CONTINENTS_CSV: &str = "continents.csv";
pub const COUNTRIES_CSV: &str = "countries.csv";
pub const MANIFEST_JSON: &str = "run_manifest.json";

/// A fully encoded output file, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: &'static str, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }

    pub fn digest(&self) -> FileDigest {
        FileDigest::of(self.name, &self.bytes)
    }
}

fn epoch_days(date: NaiveDate) -> i32 {
    // NaiveDate::default() is 1970-01-01.
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn date_column(dates: impl Iterator<Item = NaiveDate>) -> Result<Column> {
    let days: Vec<i32> = dates.map(epoch_days).collect();
    let series = Series::new("date".into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

/// The long-form table, one row per record, in record order.
pub fn enriched_frame(records: &[StandardizedRecord]) -> Result<DataFrame> {
    let countries: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let continents: Vec<&str> = records.iter().map(|r| r.continent.as_str()).collect();
    let count = |metric: Metric| -> Vec<i64> {
        records.iter().map(|r| *r.metrics.get(metric)).collect()
    };
    let per_capita = |metric: Metric| -> Vec<f64> {
        records.iter().map(|r| *r.standardized.get(metric)).collect()
    };
    let latitudes: Vec<f64> = records.iter().map(|r| r.latitude).collect();
    let longitudes: Vec<f64> = records.iter().map(|r| r.longitude).collect();
    let populations: Vec<u64> = records.iter().map(|r| r.population).collect();
    let date_strings: Vec<String> = records.iter().map(StandardizedRecord::date_key).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(13);
    columns.push(date_column(records.iter().map(|r| r.date))?);
    columns.push(Series::new("country".into(), countries).into());
    columns.push(Series::new("continent".into(), continents).into());
    for metric in Metric::ALL {
        columns.push(Series::new(metric.as_str().into(), count(metric)).into());
    }
    columns.push(Series::new("latitude".into(), latitudes).into());
    columns.push(Series::new("longitude".into(), longitudes).into());
    columns.push(Series::new("population".into(), populations).into());
    for metric in Metric::ALL {
        let name = format!("std_{metric}");
        columns.push(Series::new(name.as_str().into(), per_capita(metric)).into());
    }
    columns.push(Series::new("date_string".into(), date_strings).into());

    Ok(DataFrame::new(columns)?)
}

/// A `date` column followed by one `Int64` column per pivot column.
pub fn pivot_frame(table: &PivotTable) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(table.width() + 1);
    columns.push(date_column(table.index.iter().copied())?);

    for (col, name) in table.columns.iter().enumerate() {
        let values: Vec<i64> = table.values.iter().map(|row| row[col]).collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}

pub fn csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut clone = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut clone)?;
    Ok(buffer)
}

pub fn parquet_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let mut clone = df.clone();
        ParquetWriter::new(&mut cursor)
            .with_compression(ParquetCompression::Zstd(None))
            .with_statistics(StatisticsOptions::default())
            .finish(&mut clone)?;
    }
    Ok(buffer)
}

/// The aggregate is published as a one-element JSON array.
pub fn aggregate_json(aggregate: &GlobalAggregate) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&[aggregate])?)
}

fn staging_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{name}.partial"))
}

/// Writes each artifact into `dir`, creating it if needed, and returns their digests in
/// the order given.
///
/// Every artifact is first written under a temporary name. Only when all of them are on
/// disk are they renamed into place, so a failed write leaves earlier outputs untouched.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<FileDigest>> {
    fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;

    let mut staged: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = staging_path(dir, artifact.name);
        if let Err(err) = fs::write(&path, &artifact.bytes) {
            for leftover in &staged {
                let _ = fs::remove_file(leftover);
            }
            return Err(PipelineError::io(&path, err));
        }
        staged.push(path);
    }

    let mut digests = Vec::with_capacity(artifacts.len());
    for (artifact, staged_path) in artifacts.iter().zip(&staged) {
        let path = dir.join(artifact.name);
        fs::rename(staged_path, &path).map_err(|err| PipelineError::io(&path, err))?;
        let digest = artifact.digest();
        debug!(path = %path.display(), hash = %digest.blake3, bytes = digest.bytes, "wrote artifact");
        digests.push(digest);
    }

    info!(dir = %dir.display(), files = digests.len(), "wrote outputs");
    Ok(digests)
}
