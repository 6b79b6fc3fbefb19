//! Task dispatch between callers and a fixed pool of named workers.
//!
//! [`UnboundedQueue`] is the FIFO hand-off point, [`NamedWorkerScheduler`] owns the
//! workers that drain it, and every scheduled task gets its own [`Completion`].

pub mod completion;
pub mod config;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod scheduler;

pub use completion::{Completion, TaskOutcome};
pub use config::{Config, ShutdownPolicy};
pub use error::SchedulerError;
pub use metrics::SchedulerMetrics;
pub use queue::{TaskQueue, UnboundedQueue};
pub use scheduler::{NamedWorkerScheduler, SchedulerState, Task, WorkerId};
