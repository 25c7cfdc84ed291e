#![forbid(unsafe_code)]
// Enable as many useful Rust warnings as we can stand.
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

//! # quadra_core
//!
//! Scheduling engine for single-day, multi-category court tournaments.
//!
//! The crate is organised around the flow of data on tournament day:
//!
//! 1. [`bracket`] turns a category configuration into its full match
//!    graph (group round-robins, single or double elimination trees),
//!    with deferred team slots expressed as [`placeholder::Placeholder`]s.
//! 2. [`group::standings`] ranks a group from its recorded scores and
//!    [`resolve`] fills playoff slots as results and finished groups
//!    become known.
//! 3. [`deps`] converts placeholders into an explicit dependency graph
//!    and [`schedule`] walks a tick timeline, placing every match on a
//!    `(time, court)` pair without violating court, player or ordering
//!    constraints.
//! 4. [`ops`] is the operator surface: reschedule, manual edits, CSV
//!    rows, team renames.
//!
//! All state lives in a [`state::Tournament`] document; persistence of
//! that document is a separate crate's concern.

pub mod bracket;
pub mod clock;
pub mod config;
pub mod court;
pub mod deps;
pub mod error;
pub mod fixture;
pub mod group;
pub mod ops;
pub mod placeholder;
pub mod playoff;
pub mod resolve;
pub mod schedule;
pub mod state;
pub mod team;

pub use error::{Error, ErrorKind};
