//! End-to-end run: load, reshape, classify, sanitize, join, aggregate, write.
//!
//! [`process`] is the pure part and works on already loaded tables. [`run`] adds the file
//! system on both sides and records a manifest of what it read and wrote.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::aggregator::{continent_series, country_breakdown, global_aggregate};
use crate::config::PipelineConfig;
use crate::continent::{ContinentClassifier, ContinentResolver};
use crate::error::Result;
use crate::joiner::{join_population, JoinSummary};
use crate::loader::{load_sources, FileDigest, SourceTables};
use crate::outputs::{
    aggregate_json, csv_bytes, enriched_frame, parquet_bytes, pivot_frame, write_artifacts,
    Artifact, AGGREGATE_JSON, CONTINENTS_CSV, COUNTRIES_CSV, ENRICHED_CSV, ENRICHED_PARQUET,
    MANIFEST_JSON,
};
use crate::reshaper::reshape;
use crate::sanitizer::{sanitize, SanitizeSummary};
use crate::table::PivotTable;
use crate::types::{GlobalAggregate, Metric, StandardizedRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub long_form_rows: usize,
    pub sanitize: SanitizeSummary,
    pub join: JoinSummary,
    pub output_rows: usize,
    pub continent_metric: Metric,
    pub latest_date: String,
}

/// Everything a run computes, before encoding.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<StandardizedRecord>,
    pub continents: PivotTable,
    pub countries: PivotTable,
    pub aggregate: GlobalAggregate,
    pub summary: PipelineSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    pub inputs: Vec<FileDigest>,
    pub outputs: Vec<FileDigest>,
    pub summary: PipelineSummary,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output_dir: PathBuf,
    pub aggregate: GlobalAggregate,
    pub manifest: RunManifest,
}

pub fn process(tables: &SourceTables, config: &PipelineConfig) -> Result<PipelineOutput> {
    process_with(tables, config, &ContinentClassifier::new())
}

/// Same as [`process`] with a caller-built classifier.
pub fn process_with<R>(
    tables: &SourceTables,
    config: &PipelineConfig,
    classifier: &ContinentClassifier<R>,
) -> Result<PipelineOutput>
where
    R: ContinentResolver,
{
    let long_form = reshape(tables)?;
    let long_form_rows = long_form.len();

    let classified = classifier.classify_records(long_form);
    let (enriched, sanitize_summary) = sanitize(classified, &config.sanitizer());
    let (records, join_summary) = join_population(enriched, &tables.reference);

    let aggregate = global_aggregate(&records)?;
    let continents = continent_series(&records, config.continent_metric);
    let countries = country_breakdown(&records);

    let summary = PipelineSummary {
        long_form_rows,
        sanitize: sanitize_summary,
        join: join_summary,
        output_rows: records.len(),
        continent_metric: config.continent_metric,
        latest_date: aggregate.label_date.clone(),
    };

    Ok(PipelineOutput {
        records,
        continents,
        countries,
        aggregate,
        summary,
    })
}

/// Encodes every output file. The manifest is not included.
pub fn render_artifacts(output: &PipelineOutput, config: &PipelineConfig) -> Result<Vec<Artifact>> {
    let enriched = enriched_frame(&output.records)?;

    let mut artifacts = vec![
        Artifact::new(ENRICHED_CSV, csv_bytes(&enriched)?),
        Artifact::new(AGGREGATE_JSON, aggregate_json(&output.aggregate)?),
        Artifact::new(CONTINENTS_CSV, csv_bytes(&pivot_frame(&output.continents)?)?),
        Artifact::new(COUNTRIES_CSV, csv_bytes(&pivot_frame(&output.countries)?)?),
    ];
    if config.write_parquet {
        artifacts.push(Artifact::new(ENRICHED_PARQUET, parquet_bytes(&enriched)?));
    }
    Ok(artifacts)
}

/// Runs the whole pipeline against the configured directories.
///
/// Nothing is written unless every stage succeeds. The output files and the manifest are
/// written as one batch through [`write_artifacts`].
pub fn run(config: &PipelineConfig) -> Result<PipelineRun> {
    info!(
        source_dir = %config.source_dir.display(),
        output_dir = %config.output_dir().display(),
        remove_cruise = config.remove_cruise,
        "starting pipeline run"
    );

    let tables = load_sources(&config.source_dir, &config.sources)?;
    let output = process(&tables, config)?;
    let mut artifacts = render_artifacts(&output, config)?;

    let manifest = RunManifest {
        inputs: tables.digests,
        outputs: artifacts.iter().map(Artifact::digest).collect(),
        summary: output.summary,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
    artifacts.push(Artifact::new(MANIFEST_JSON, manifest_bytes));

    let output_dir = config.output_dir().to_path_buf();
    write_artifacts(&output_dir, &artifacts)?;

    info!(
        rows = manifest.summary.output_rows,
        label_date = %output.aggregate.label_date,
        "pipeline run complete"
    );

    Ok(PipelineRun {
        output_dir,
        aggregate: output.aggregate,
        manifest,
    })
}
