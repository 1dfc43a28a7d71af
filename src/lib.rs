//! Adaptive vocabulary drill engine.
//!
//! The crate is split into three layers:
//! - [`sched`] — pure scheduling algorithms: weighted sampling, batch
//!   generation, the new-set/practicing progression and exam grading
//! - [`cache`] — the offline topic cache: persisted store, network fetch,
//!   topic-file parsing and the synchronizer reconciling them
//! - [`scheduler`] — the session facade the host UI talks to
//!
//! View rendering, animations and the embedded game runtime are external
//! collaborators; they reach this crate only through
//! [`scheduler::HostHooks`] and the [`DrillScheduler`] surface.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod mastery;
pub mod sched;
pub mod scheduler;

#[cfg(test)]
pub mod testing;

pub use catalog::ExerciseCatalog;
pub use domain::{AnswerState, ExerciseItem, ItemId, LanguagePair, WordGroup};
pub use mastery::{MasteryStore, ScoringPolicy};
pub use scheduler::{DrillScheduler, HostHooks, SessionState};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber. Hosts embedding the engine call
/// this once at startup; tests leave it uninstalled.
pub fn init_tracing() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "worddrill=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();
}
