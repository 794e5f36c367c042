//! Solved timetables as tables.
//!
//! - [`ScheduleExtractor`]: sorted rows with 1-based days and rooms and
//!   clock start times, plus an independent recomputation of the soft cost
//! - [`find_violations`]: audit of the hard rules without the CP model

mod extractor;
mod validation;

pub use extractor::{ScheduleExtractor, ScheduleRow, ScheduleTable};
pub use validation::{find_violations, HardViolation};
