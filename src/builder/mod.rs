//! Exam timetabling model construction.
//!
//! Turns a [`Roster`](crate::exam::Roster) and a
//! [`ConstraintsConfig`](crate::exam::ConstraintsConfig) into a
//! [`CpModel`](crate::cp::CpModel) holding the hard rules
//! ([`ExamModelBuilder`]), then attaches the weighted soft cost
//! ([`ObjectiveComposer`]).
//!
//! # Examples
//!
//! ```
//! use u_timetable::builder::{ExamModelBuilder, ObjectiveComposer, ObjectiveWeights, Placement};
//! use u_timetable::exam::{ConstraintsConfig, Exam, Roster};
//!
//! let roster = Roster::new(vec![
//!     Exam::new(0, "Anna", "Prof. A", "Prof. B"),
//!     Exam::new(1, "Bernd", "Prof. A", "Prof. B"),
//! ])
//! .unwrap();
//! let config = ConstraintsConfig::new(1, 1, 30);
//! let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
//! ObjectiveComposer::new(ObjectiveWeights::new(1, 0))
//!     .compose(&mut model)
//!     .unwrap();
//!
//! let assignment = model
//!     .complete(&[Placement::new(0, 0), Placement::new(30, 0)])
//!     .unwrap();
//! // two professors, one active day each
//! assert_eq!(model.objective_value(&assignment), 2);
//! ```

mod exam_model;
mod hard;
mod objective;

pub use exam_model::{ExamAssignment, ExamModel, ExamVars, Placement};
pub use hard::ExamModelBuilder;
pub use objective::{
    ComposedObjective, CrossRoomTerm, ObjectiveComposer, ObjectiveWeights, PairSpan,
    CROSS_ROOM_PENALTY, OBJECTIVE_CAP,
};
