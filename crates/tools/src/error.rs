//! Error types for the tools

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Option {0} expects a value")]
    MissingValue(String),

    #[error("Failed to read file list {path}: {source}")]
    FileList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShimResult<T> = Result<T, ShimError>;
