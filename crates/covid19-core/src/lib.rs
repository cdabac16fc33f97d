pub mod aggregator;
pub mod config;
pub mod continent;
pub mod error;
pub mod joiner;
pub mod loader;
pub mod outputs;
pub mod pipeline;
pub mod reshaper;
pub mod sanitizer;
pub mod table;
pub mod types;

pub use config::{PipelineConfig, SourceLayout};
pub use continent::{classify_country, ContinentClassifier, ContinentResolver, CountryCodeResolver};
pub use error::{PipelineError, Result};
pub use pipeline::{process, run, PipelineOutput, PipelineRun, PipelineSummary, RunManifest};
pub use types::{
    Continent, GlobalAggregate, LongFormRecord, Metric, Metrics, StandardizedRecord,
};
