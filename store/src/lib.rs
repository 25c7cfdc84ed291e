#![forbid(unsafe_code)]

//! # quadra_store
//!
//! Persistence for the tournament document and the schedule's CSV
//! shape. The document is one JSON blob; writes replace it whole, so
//! observers see either the previous or the next state, never a mix.
//! All read-modify-write cycles go through a single mutex, which is
//! the whole concurrency story the document needs.

pub mod document;
pub mod schedule_csv;

use quadra_core::ErrorKind;
use thiserror::Error;

pub use document::DocumentStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not access the tournament document: {0}")]
    Io(#[from] std::io::Error),
    #[error("the tournament document is not valid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not process schedule rows: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Core(#[from] quadra_core::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Csv(_) => ErrorKind::Persistence,
            StoreError::Core(err) => err.kind(),
        }
    }
}
