pub mod outcome;
pub mod scheduling;

pub use outcome::{CrmOperation, CrmStepReport, ScheduleOutcome, StepStatus};
pub use scheduling::{SchedulingRequest, ValidatedRequest};
