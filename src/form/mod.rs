//! Contact form: field validation and the simulated submission flow.

pub mod submission;
pub mod validation;

pub use submission::{SimulatedTransport, SubmissionFlow, SubmissionPhase, SubmissionTransport, SubmitOutcome};
pub use validation::{is_email, validate, FieldProblem, ValidationReport};
