// crates/covid19-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::aggregator::AggregateError;
use crate::reshaper::ReshapeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source unavailable: {}", path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("File I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parser {
        path: PathBuf,
        #[source]
        source: covid19_parser::ParserError,
    },

    #[error(transparent)]
    Reshape(#[from] ReshapeError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
