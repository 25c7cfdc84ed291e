//! # Court inventory
//!
//! Physical courts with their operating windows. A court may open and
//! close several times over the day (morning and afternoon blocks, say);
//! each block is a [`CourtSlot`]. The scheduler only ever asks one
//! question of a court: does some slot contain a whole match interval.
use crate::clock::{ClockTime, Minutes};
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Court identifier, unique across the inventory.
#[derive(
    Debug,
    Display,
    Clone,
    AsRef,
    From,
    Into,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
)]
#[as_ref(forward)]
pub struct CourtName(String);

impl From<&str> for CourtName {
    fn from(name: &str) -> Self {
        CourtName(String::from(name))
    }
}

/// One operating interval of a court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSlot {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl CourtSlot {
    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Errors unless `end_time > start_time`.
    pub fn try_new(start_time: ClockTime, end_time: ClockTime) -> Result<Self, CourtError> {
        if end_time > start_time {
            Ok(CourtSlot {
                start_time,
                end_time,
            })
        } else {
            Err(CourtError::EmptyWindow {
                start: start_time,
                end: end_time,
            })
        }
    }

    /// A match fits iff the whole interval `[start, start + duration]`
    /// lies inside the slot.
    pub fn contains(&self, start: ClockTime, duration: Minutes) -> bool {
        match start.checked_add(duration) {
            Some(end) => self.start_time <= start && end <= self.end_time,
            None => false,
        }
    }
}

/// A court with its scheduling priority and operating windows.
///
/// Lower priority numbers are preferred by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub name: CourtName,
    pub priority: u32,
    pub slots: Vec<CourtSlot>,
}

impl Court {
    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Errors when the court has no operating window or when two
    /// windows overlap.
    pub fn try_new(
        name: CourtName,
        priority: u32,
        mut slots: Vec<CourtSlot>,
    ) -> Result<Self, CourtError> {
        if slots.is_empty() {
            return Err(CourtError::NoSlots(name));
        }
        slots.sort_by_key(|slot| slot.start_time);
        let overlapping = slots
            .windows(2)
            .any(|pair| pair[1].start_time < pair[0].end_time);
        if overlapping {
            return Err(CourtError::OverlappingSlots(name));
        }
        Ok(Court {
            name,
            priority,
            slots,
        })
    }

    /// Whether some operating window contains the whole match interval.
    pub fn fits(&self, start: ClockTime, duration: Minutes) -> bool {
        self.slots.iter().any(|slot| slot.contains(start, duration))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CourtError {
    #[error("operating window must end after it starts, got {start}..{end}")]
    EmptyWindow { start: ClockTime, end: ClockTime },
    #[error("court '{0}' has no operating window")]
    NoSlots(CourtName),
    #[error("court '{0}' has overlapping operating windows")]
    OverlappingSlots(CourtName),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> ClockTime {
        ClockTime::new(h, m).unwrap()
    }

    fn slot(from: (u32, u32), to: (u32, u32)) -> CourtSlot {
        CourtSlot::try_new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    #[test]
    fn containment_includes_both_edges() {
        let s = slot((9, 0), (11, 0));
        assert!(s.contains(at(9, 0), Minutes(20)));
        assert!(s.contains(at(10, 40), Minutes(20)));
        assert!(!s.contains(at(10, 41), Minutes(20)));
        assert!(!s.contains(at(8, 59), Minutes(20)));
    }

    #[test]
    fn rejects_inverted_window() {
        assert!(CourtSlot::try_new(at(11, 0), at(9, 0)).is_err());
    }

    #[test]
    fn rejects_overlapping_windows() {
        let slots = vec![slot((9, 0), (12, 0)), slot((11, 30), (14, 0))];
        assert!(Court::try_new("Quadra 1".into(), 1, slots).is_err());
    }

    #[test]
    fn fits_over_split_windows() {
        let court = Court::try_new(
            "Quadra 1".into(),
            1,
            vec![slot((9, 0), (12, 0)), slot((13, 0), (18, 0))],
        )
        .unwrap();
        assert!(court.fits(at(11, 40), Minutes(20)));
        // The gap between the windows does not host matches.
        assert!(!court.fits(at(11, 50), Minutes(20)));
        assert!(court.fits(at(13, 0), Minutes(20)));
    }
}
