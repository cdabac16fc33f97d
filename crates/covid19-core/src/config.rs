use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::sanitizer::SanitizerConfig;
use crate::types::Metric;

/// Input file locations, relative to the source directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourceLayout {
    pub reference: PathBuf,
    pub confirmed: PathBuf,
    pub recovered: PathBuf,
    pub deaths: PathBuf,
}

impl Default for SourceLayout {
    fn default() -> Self {
        let series = Path::new("csse_covid_19_time_series");
        SourceLayout {
            reference: PathBuf::from("UID_ISO_FIPS_LookUp_Table.csv"),
            confirmed: series.join("time_series_covid19_confirmed_global.csv"),
            recovered: series.join("time_series_covid19_recovered_global.csv"),
            deaths: series.join("time_series_covid19_deaths_global.csv"),
        }
    }
}

impl SourceLayout {
    pub fn metric_path(&self, metric: Metric) -> &Path {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Recovered => &self.recovered,
            Metric::Deaths => &self.deaths,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    /// Defaults to `source_dir` when unset.
    pub output_dir: Option<PathBuf>,
    pub remove_cruise: bool,
    pub continent_metric: Metric,
    pub write_parquet: bool,
    pub sources: SourceLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source_dir: PathBuf::from("csse_covid_19_data"),
            output_dir: None,
            remove_cruise: true,
            continent_metric: Metric::Confirmed,
            write_parquet: false,
            sources: SourceLayout::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            source_dir: source_dir.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| PipelineError::Config(err.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
        Self::from_toml_str(&content)
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.source_dir)
    }

    pub fn sanitizer(&self) -> SanitizerConfig {
        SanitizerConfig {
            remove_cruise: self.remove_cruise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
                source_dir = "/data/jhu"
                remove_cruise = false
                continent_metric = "deaths"

                [sources]
                reference = "lookup.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_dir, PathBuf::from("/data/jhu"));
        assert!(!config.remove_cruise);
        assert_eq!(config.continent_metric, Metric::Deaths);
        assert_eq!(config.sources.reference, PathBuf::from("lookup.csv"));
        assert_eq!(
            config.sources.confirmed,
            SourceLayout::default().confirmed
        );
        assert_eq!(config.output_dir(), Path::new("/data/jhu"));
    }

    #[test]
    fn unknown_metric_is_a_config_error() {
        let err = PipelineConfig::from_toml_str("continent_metric = \"active\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
