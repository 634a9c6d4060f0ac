mod deadline;
mod engine;

pub use deadline::{
    DeadlineFn, DeadlineGuard, DeadlineScheduler, ManualDeadlineScheduler, ManualDeadlines,
    ThreadDeadlineScheduler,
};
pub use engine::{DurationSource, Phase, TimerEngine};
