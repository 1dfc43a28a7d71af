pub mod item;
pub mod topic;

pub use item::{AnswerState, ExerciseItem, ItemId};
pub use topic::{LanguagePair, WordGroup};
