pub mod assignment;
pub mod grading;
pub mod question;
pub mod view;

pub use assignment::{Assignment, AssignmentStatus, AuthoringError, NewAssignment};
pub use grading::{CorrectnessSource, GradeRequest, GradingResult, QuestionOutcome};
pub use question::{Question, QuestionId, QuestionKind, QuestionVariant};
pub use view::AssignmentView;
