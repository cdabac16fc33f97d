use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use covid19_parser::{parse_reference_table, parse_time_series, ReferenceTable, TimeSeriesTable};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SourceLayout;
use crate::error::{PipelineError, Result};
use crate::types::Metric;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigest {
    pub path: String,
    pub blake3: String,
    pub bytes: usize,
}

impl FileDigest {
    pub fn of(path: impl Into<String>, contents: &[u8]) -> Self {
        Self {
            path: path.into(),
            blake3: compute_hash(contents),
            bytes: contents.len(),
        }
    }
}

/// Everything read from the source directory for one run.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub confirmed: TimeSeriesTable,
    pub recovered: TimeSeriesTable,
    pub deaths: TimeSeriesTable,
    pub reference: ReferenceTable,
    pub digests: Vec<FileDigest>,
}

impl SourceTables {
    pub fn metric(&self, metric: Metric) -> &TimeSeriesTable {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Recovered => &self.recovered,
            Metric::Deaths => &self.deaths,
        }
    }
}

/// Reads the three metric tables and the reference table.
///
/// Every required path is checked before anything is parsed, so a missing file is
/// reported as [`PipelineError::SourceUnavailable`] regardless of the others' contents.
pub fn load_sources(source_dir: &Path, layout: &SourceLayout) -> Result<SourceTables> {
    if !source_dir.is_dir() {
        return Err(PipelineError::SourceUnavailable {
            path: source_dir.to_path_buf(),
        });
    }

    let required = [
        &layout.reference,
        &layout.confirmed,
        &layout.recovered,
        &layout.deaths,
    ];
    for relative in required {
        let path = source_dir.join(relative);
        if !path.is_file() {
            return Err(PipelineError::SourceUnavailable { path });
        }
    }

    let mut digests = Vec::with_capacity(required.len());

    let (content, digest) = read_source(source_dir, &layout.reference)?;
    digests.push(digest);
    let reference = parse_reference_table(&content).map_err(|source| PipelineError::Parser {
        path: source_dir.join(&layout.reference),
        source,
    })?;
    info!(
        format = reference.format,
        countries = reference.records.len(),
        "loaded reference table"
    );

    let mut load_metric = |metric: Metric| -> Result<TimeSeriesTable> {
        let relative = layout.metric_path(metric);
        let (content, digest) = read_source(source_dir, relative)?;
        digests.push(digest);
        let table = parse_time_series(&content).map_err(|source| PipelineError::Parser {
            path: source_dir.join(relative),
            source,
        })?;
        info!(
            metric = metric.as_str(),
            format = table.format,
            countries = table.rows.len(),
            dates = table.date_columns.len(),
            "loaded time series"
        );
        Ok(table)
    };

    let confirmed = load_metric(Metric::Confirmed)?;
    let recovered = load_metric(Metric::Recovered)?;
    let deaths = load_metric(Metric::Deaths)?;

    Ok(SourceTables {
        confirmed,
        recovered,
        deaths,
        reference,
        digests,
    })
}

fn read_source(source_dir: &Path, relative: &Path) -> Result<(String, FileDigest)> {
    let path: PathBuf = source_dir.join(relative);
    let bytes = fs::read(&path).map_err(|err| PipelineError::io(&path, err))?;
    let digest = FileDigest::of(relative.to_string_lossy(), &bytes);
    debug!(path = %path.display(), hash = %digest.blake3, "read source file");

    let content = String::from_utf8(bytes).map_err(|err| {
        PipelineError::io(&path, io::Error::new(io::ErrorKind::InvalidData, err))
    })?;
    Ok((content, digest))
}

pub(crate) fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
