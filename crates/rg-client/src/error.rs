//! Error types for remote authorization checks

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("role check request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;
