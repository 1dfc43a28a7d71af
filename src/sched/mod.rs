pub mod exam;
pub mod generator;
pub mod progress;
pub mod sampler;

pub use exam::{grade_exam, ExamOutcome, ExamSheet};
pub use generator::generate_batch;
pub use progress::{Mode, ProgressStateMachine};
pub use sampler::{sampling_weight, CumulativeWeights, SamplerError};
