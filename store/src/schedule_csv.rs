//! CSV shape of the schedule.
//!
//! Columns: `matchId, category, stage, team1, team2, time, court`.
//! Export writes one row per match, empty time and court for anything
//! unassigned; importing such a row clears the assignment, so an
//! export-import cycle reproduces the board exactly.
use crate::StoreError;
use quadra_core::ops::ScheduleRow;
use std::io::{Read, Write};

pub fn write_schedule<W: Write>(rows: &[ScheduleRow], writer: W) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_schedule<R: Read>(reader: R) -> Result<Vec<ScheduleRow>, StoreError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
