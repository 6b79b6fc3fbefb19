use crate::error::SchedulerError;
use prometheus::{IntCounter, IntGauge, Registry};

/// Counters and gauges describing one scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerMetrics {
	pub tasks_scheduled: IntCounter,
	pub tasks_completed: IntCounter,
	pub tasks_panicked: IntCounter,
	pub active_workers: IntGauge,
	pub pending_tasks: IntGauge,
}

impl SchedulerMetrics {
	/// Builds unregistered metrics.
	///
	/// # Errors
	/// Returns an error if a metric definition is rejected by prometheus.
	pub fn new() -> Result<Self, SchedulerError> {
		Ok(Self {
			tasks_scheduled: IntCounter::new("task_queue_tasks_scheduled", "Total tasks pushed to the queue")?,
			tasks_completed: IntCounter::new("task_queue_tasks_completed", "Total tasks that returned normally")?,
			tasks_panicked: IntCounter::new("task_queue_tasks_panicked", "Total tasks whose body panicked")?,
			active_workers: IntGauge::new("task_queue_active_workers", "Number of running workers")?,
			pending_tasks: IntGauge::new("task_queue_pending_tasks", "Tasks waiting in the queue")?,
		})
	}

	/// Builds the metrics and registers them into `registry`.
	///
	/// # Errors
	/// Returns an error if a metric with the same name is already registered.
	pub fn register(registry: &Registry) -> Result<Self, SchedulerError> {
		let metrics = Self::new()?;

		registry.register(Box::new(metrics.tasks_scheduled.clone()))?;
		registry.register(Box::new(metrics.tasks_completed.clone()))?;
		registry.register(Box::new(metrics.tasks_panicked.clone()))?;
		registry.register(Box::new(metrics.active_workers.clone()))?;
		registry.register(Box::new(metrics.pending_tasks.clone()))?;

		Ok(metrics)
	}
}
