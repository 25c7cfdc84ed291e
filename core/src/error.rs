//! Top-level error type for `quadra_core`
//!
//! Module errors stay local and specific; this type aggregates them at
//! the public operation boundary and classifies each failure into one
//! of the coarse kinds the operator surface reports.
use crate::bracket::BracketError;
use crate::clock::ClockError;
use crate::config::ConfigError;
use crate::court::CourtError;
use crate::deps::DepsError;
use crate::group::GroupError;
use crate::ops::OpsError;
use crate::placeholder::PlaceholderError;
use crate::schedule::ScheduleError;
use crate::team::TeamError;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidConfig,
    NotFound,
    Conflict,
    OutOfWindow,
    SchedulerTimeout,
    Cancelled,
    Persistence,
}

/// Top-level error type for `quadra_core`
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Deps(#[from] DepsError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Ops(#[from] OpsError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Court(#[from] CourtError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),
    #[error(transparent)]
    Team(#[from] TeamError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_)
            | Error::Bracket(_)
            | Error::Deps(_)
            | Error::Clock(_)
            | Error::Court(_)
            | Error::Group(_)
            | Error::Placeholder(_)
            | Error::Team(_) => ErrorKind::InvalidConfig,
            Error::Schedule(err) => match err {
                ScheduleError::Config(_) | ScheduleError::Deps(_) => ErrorKind::InvalidConfig,
                ScheduleError::Cancelled => ErrorKind::Cancelled,
                ScheduleError::IterationCap(_) => ErrorKind::SchedulerTimeout,
            },
            Error::Ops(err) => err.kind(),
        }
    }
}
