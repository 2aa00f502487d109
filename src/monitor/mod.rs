pub mod checkers;
pub mod interval;
pub mod population;
pub mod recorder;
pub mod scheduler;

pub use checkers::{CheckOutcome, CheckStrategy, HealthChecker, StatusUpdate};
pub use scheduler::{Scheduler, SchedulerState};
