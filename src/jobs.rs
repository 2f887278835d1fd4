//! Batch job orchestration and remote task polling.

pub mod orchestrator;
pub mod poll;
pub mod registry;
pub mod worker;

pub use orchestrator::{Orchestrator, OrchestratorOpts};
pub use poll::{PollOpts, poll_until_terminal};
pub use registry::{InMemoryJobRegistry, JobRegistry};
pub use worker::{BatchContext, SlideWorker, StudioWorker};
