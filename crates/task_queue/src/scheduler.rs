use crate::completion::{completion, Completion, TaskOutcome};
use crate::config::{Config as SchedulerConfig, ShutdownPolicy};
use crate::error::SchedulerError;
use crate::metrics::SchedulerMetrics;
use crate::queue::TaskQueue;
use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A unit of work, run exactly once with the identity of the worker that claimed it.
pub type Task<K> = Box<dyn FnOnce(K) + Send + 'static>;

/// Identity of a worker, e.g. the address of the backend it talks to.
pub trait WorkerId: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> WorkerId for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
	NotStarted,
	Running,
	Stopped,
}

enum Lifecycle<K> {
	NotStarted,
	Running {
		worker_ids: Vec<K>,
		stop: CancellationToken,
		handles: Vec<JoinHandle<()>>,
	},
	Stopped,
}

/// Routes submitted tasks through one shared queue to a fixed set of named workers.
///
/// Every worker pulls from the same queue, so whichever worker is idle claims the
/// next task in FIFO order. Nothing is pinned to a worker ahead of time.
///
/// Lifecycle: `NotStarted --start--> Running --stop--> Stopped`. Tasks scheduled
/// outside of `Running` are queued but only run if the workers are still alive
/// to claim them.
pub struct NamedWorkerScheduler<K: WorkerId> {
	queue: Arc<dyn TaskQueue<Task<K>>>,
	cancellation_token: CancellationToken,
	config: SchedulerConfig,
	metrics: Option<SchedulerMetrics>,
	lifecycle: Mutex<Lifecycle<K>>,
}

impl<K: WorkerId> NamedWorkerScheduler<K> {
	/// `cancellation_token` is the process-wide shutdown signal. Cancelling it has
	/// the same effect on workers as [`stop`](Self::stop) with
	/// [`ShutdownPolicy::Abandon`], but does not join them.
	pub fn new(queue: Arc<dyn TaskQueue<Task<K>>>, cancellation_token: CancellationToken, config: SchedulerConfig) -> Self {
		Self {
			queue,
			cancellation_token,
			config,
			metrics: None,
			lifecycle: Mutex::new(Lifecycle::NotStarted),
		}
	}

	#[must_use]
	pub fn with_metrics(mut self, metrics: SchedulerMetrics) -> Self {
		self.metrics = Some(metrics);
		self
	}

	fn lock(&self) -> MutexGuard<'_, Lifecycle<K>> {
		self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Spawns one persistent worker per identity. Must be called inside a tokio runtime.
	///
	/// Starting with no identities is allowed, but then nothing scheduled ever runs.
	///
	/// # Errors
	/// Returns [`SchedulerError::AlreadyStarted`] unless the scheduler is in `NotStarted`.
	pub fn start(&self, worker_ids: impl IntoIterator<Item = K>) -> Result<(), SchedulerError> {
		let mut lifecycle = self.lock();
		if !matches!(*lifecycle, Lifecycle::NotStarted) {
			return Err(SchedulerError::AlreadyStarted);
		}

		let worker_ids: Vec<K> = worker_ids.into_iter().collect();
		let stop = CancellationToken::new();

		let handles = worker_ids
			.iter()
			.cloned()
			.map(|id| {
				let worker = Worker {
					id,
					queue: Arc::clone(&self.queue),
					stop: stop.clone(),
					cancellation_token: self.cancellation_token.clone(),
					policy: self.config.shutdown_policy,
					metrics: self.metrics.clone(),
				};
				tokio::spawn(worker.run())
			})
			.collect();

		if worker_ids.is_empty() {
			warn!("Scheduler started without workers, scheduled tasks will never run");
		}
		info!(
			worker_count = worker_ids.len(),
			worker_ids = ?worker_ids,
			shutdown_policy = %self.config.shutdown_policy,
			"Scheduler started"
		);

		*lifecycle = Lifecycle::Running { worker_ids, stop, handles };
		Ok(())
	}

	/// Queues `task` and returns its completion signal without waiting.
	///
	/// The task runs on the blocking thread pool, so it may block, and it may
	/// drive async work through a captured [`tokio::runtime::Handle`]. A panic in
	/// the task is caught and reported through the returned [`Completion`].
	pub fn schedule<F>(&self, task: F) -> Completion
	where
		F: FnOnce(K) + Send + 'static,
	{
		let (completer, completion) = completion();
		let metrics = self.metrics.clone();

		self.queue.push(Box::new(move |worker_id: K| {
			let outcome = run_isolated(task, worker_id.clone());

			if let Some(metrics) = &metrics {
				match outcome {
					TaskOutcome::Completed => metrics.tasks_completed.inc(),
					_ => metrics.tasks_panicked.inc(),
				}
			}
			if let TaskOutcome::Panicked { message } = &outcome {
				error!(worker = ?worker_id, panic = %message, "Task panicked, worker keeps running");
			}

			completer.complete(outcome);
		}));

		if let Some(metrics) = &self.metrics {
			metrics.tasks_scheduled.inc();
			metrics.pending_tasks.set(saturating_i64(self.queue.len()));
		}

		completion
	}

	/// Signals every worker to exit and waits until all of them have.
	///
	/// A task a worker is already running always finishes first. Tasks still
	/// queued are handled according to the configured [`ShutdownPolicy`].
	///
	/// # Errors
	/// Returns [`SchedulerError::NotRunning`] unless the scheduler is in `Running`.
	pub async fn stop(&self) -> Result<(), SchedulerError> {
		let (stop, handles) = {
			let mut lifecycle = self.lock();
			match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
				Lifecycle::Running { stop, handles, .. } => (stop, handles),
				other => {
					*lifecycle = other;
					return Err(SchedulerError::NotRunning);
				}
			}
		};

		info!(worker_count = handles.len(), "Stopping scheduler");
		stop.cancel();

		for handle in handles {
			if let Err(e) = handle.await {
				error!(error = %e, "Worker task failed to join");
			}
		}

		let pending = self.queue.len();
		if pending > 0 {
			warn!(pending, "Scheduler stopped with tasks left in the queue");
		} else {
			info!("Scheduler stopped");
		}
		Ok(())
	}

	#[must_use]
	pub fn state(&self) -> SchedulerState {
		match *self.lock() {
			Lifecycle::NotStarted => SchedulerState::NotStarted,
			Lifecycle::Running { .. } => SchedulerState::Running,
			Lifecycle::Stopped => SchedulerState::Stopped,
		}
	}

	/// Identities of the running workers; empty unless `Running`.
	#[must_use]
	pub fn worker_ids(&self) -> Vec<K> {
		match &*self.lock() {
			Lifecycle::Running { worker_ids, .. } => worker_ids.clone(),
			_ => Vec::new(),
		}
	}

	/// Number of tasks waiting to be claimed.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.queue.len()
	}
}

impl<K: WorkerId> Drop for NamedWorkerScheduler<K> {
	fn drop(&mut self) {
		if let Lifecycle::Running { stop, .. } = &*self.lock() {
			stop.cancel();
		}
	}
}

struct Worker<K: WorkerId> {
	id: K,
	queue: Arc<dyn TaskQueue<Task<K>>>,
	stop: CancellationToken,
	cancellation_token: CancellationToken,
	policy: ShutdownPolicy,
	metrics: Option<SchedulerMetrics>,
}

impl<K: WorkerId> Worker<K> {
	async fn run(self) {
		info!(worker = ?self.id, "Worker started");
		if let Some(metrics) = &self.metrics {
			metrics.active_workers.inc();
		}

		loop {
			// Signals win over a task that is ready at the same time.
			let task = tokio::select! {
				biased;
				() = self.cancellation_token.cancelled() => {
					info!(worker = ?self.id, "Worker cancelled");
					break;
				}
				() = self.stop.cancelled() => {
					if self.policy == ShutdownPolicy::Drain {
						self.drain().await;
					}
					break;
				}
				task = self.queue.pop() => task,
			};

			self.execute(task).await;
		}

		if let Some(metrics) = &self.metrics {
			metrics.active_workers.dec();
		}
		info!(worker = ?self.id, "Worker exited");
	}

	async fn drain(&self) {
		let mut drained = 0_usize;
		while !self.cancellation_token.is_cancelled() {
			let Some(task) = self.queue.try_pop() else {
				break;
			};
			self.execute(task).await;
			drained += 1;
		}
		debug!(worker = ?self.id, drained, "Worker drained queue");
	}

	async fn execute(&self, task: Task<K>) {
		if let Some(metrics) = &self.metrics {
			metrics.pending_tasks.set(saturating_i64(self.queue.len()));
		}

		let worker_id = self.id.clone();
		debug!(worker = ?worker_id, "Executing task");

		if let Err(e) = tokio::task::spawn_blocking(move || task(worker_id)).await {
			error!(worker = ?self.id, error = %e, "Task did not run to completion");
		}
	}
}

fn run_isolated<K>(task: impl FnOnce(K), worker_id: K) -> TaskOutcome {
	match panic::catch_unwind(AssertUnwindSafe(|| task(worker_id))) {
		Ok(()) => TaskOutcome::Completed,
		Err(payload) => TaskOutcome::Panicked {
			message: panic_message(payload.as_ref()),
		},
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| (*s).to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".to_string())
}

fn saturating_i64(value: usize) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::queue::UnboundedQueue;
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::time::Duration;
	use tokio::time::timeout;

	fn build_scheduler<K: WorkerId>(cancellation_token: CancellationToken, policy: ShutdownPolicy) -> NamedWorkerScheduler<K> {
		NamedWorkerScheduler::new(Arc::new(UnboundedQueue::new()), cancellation_token, SchedulerConfig::with_policy(policy))
	}

	fn default_scheduler<K: WorkerId>() -> NamedWorkerScheduler<K> {
		build_scheduler(CancellationToken::new(), ShutdownPolicy::Abandon)
	}

	#[tokio::test]
	async fn test_new_scheduler_is_not_started() {
		let scheduler = default_scheduler::<String>();

		assert_eq!(scheduler.state(), SchedulerState::NotStarted);
		assert!(scheduler.worker_ids().is_empty());
		assert_eq!(scheduler.pending(), 0);
	}

	#[tokio::test]
	async fn test_lifecycle_transitions_are_guarded() {
		let scheduler = default_scheduler::<&str>();

		assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));

		scheduler.start(["worker1", "worker2"]).unwrap();
		assert_eq!(scheduler.state(), SchedulerState::Running);
		assert_eq!(scheduler.worker_ids(), vec!["worker1", "worker2"]);
		assert!(matches!(scheduler.start(["worker3"]), Err(SchedulerError::AlreadyStarted)));

		scheduler.stop().await.unwrap();
		assert_eq!(scheduler.state(), SchedulerState::Stopped);
		assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));
		assert!(matches!(scheduler.start(["worker1"]), Err(SchedulerError::AlreadyStarted)));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_completion_waits_for_task_body() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["worker1"]).unwrap();

		let completion = scheduler.schedule(|_| std::thread::sleep(Duration::from_millis(500)));

		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(timeout(Duration::from_millis(250), completion.wait()).await.is_err());
		assert_eq!(timeout(Duration::from_secs(2), completion.wait()).await.unwrap(), TaskOutcome::Completed);

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_task_writes_are_visible_after_completion() {
		let scheduler = default_scheduler::<u8>();
		scheduler.start([1]).unwrap();

		let written = Arc::new(AtomicUsize::new(0));
		let completion = {
			let written = Arc::clone(&written);
			scheduler.schedule(move |_| {
				std::thread::sleep(Duration::from_millis(20));
				written.store(42, Ordering::Relaxed);
			})
		};

		completion.wait().await;
		assert_eq!(written.load(Ordering::Relaxed), 42);

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_dispatch_conservation() {
		let scheduler = default_scheduler::<String>();
		let worker_ids: Vec<String> = (1..=4).map(|i| format!("worker{i}")).collect();
		scheduler.start(worker_ids.clone()).unwrap();

		let executed = Arc::new(Mutex::new(HashMap::<String, usize>::new()));
		let total = 10_000;

		let completions: Vec<Completion> = (0..total)
			.map(|_| {
				let executed = Arc::clone(&executed);
				scheduler.schedule(move |worker_id| {
					*executed.lock().unwrap().entry(worker_id).or_default() += 1;
				})
			})
			.collect();

		for completion in completions {
			let outcome = timeout(Duration::from_secs(10), completion.wait()).await.expect("task was not executed in time");
			assert_eq!(outcome, TaskOutcome::Completed);
		}

		let executed = executed.lock().unwrap();
		assert_eq!(executed.values().sum::<usize>(), total);
		assert!(executed.keys().all(|id| worker_ids.contains(id)));

		drop(executed);
		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_zero_tasks_dispatches_nothing() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["a", "b"]).unwrap();
		scheduler.stop().await.unwrap();

		assert_eq!(scheduler.pending(), 0);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_idle_worker_claims_next_task() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["worker1", "worker2"]).unwrap();

		let executed = Arc::new(Mutex::new(HashMap::<&str, usize>::new()));
		let completions: Vec<Completion> = (0..2)
			.map(|_| {
				let executed = Arc::clone(&executed);
				scheduler.schedule(move |worker_id| {
					*executed.lock().unwrap().entry(worker_id).or_default() += 1;
					std::thread::sleep(Duration::from_millis(250));
				})
			})
			.collect();

		for completion in completions {
			timeout(Duration::from_secs(1), completion.wait()).await.expect("task was not executed within 1 second");
		}

		let executed = executed.lock().unwrap().clone();
		assert_eq!(executed.get("worker1"), Some(&1));
		assert_eq!(executed.get("worker2"), Some(&1));

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_task_scheduled_after_stop_never_runs() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["worker1"]).unwrap();
		scheduler.stop().await.unwrap();

		let ran = Arc::new(AtomicBool::new(false));
		let completion = {
			let ran = Arc::clone(&ran);
			scheduler.schedule(move |_| ran.store(true, Ordering::SeqCst))
		};

		assert!(timeout(Duration::from_millis(200), completion.wait()).await.is_err());
		assert!(!ran.load(Ordering::SeqCst));
		assert_eq!(scheduler.pending(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_task_scheduled_before_start_runs_once_started() {
		let scheduler = default_scheduler::<&str>();
		let completion = scheduler.schedule(|_| {});

		assert!(timeout(Duration::from_millis(50), completion.wait()).await.is_err());

		scheduler.start(["worker1"]).unwrap();
		assert_eq!(timeout(Duration::from_secs(1), completion.wait()).await.unwrap(), TaskOutcome::Completed);

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_cancellation_stops_workers() {
		let cancellation_token = CancellationToken::new();
		let scheduler = build_scheduler::<&str>(cancellation_token.clone(), ShutdownPolicy::Abandon);
		scheduler.start(["worker1"]).unwrap();

		cancellation_token.cancel();
		tokio::time::sleep(Duration::from_millis(20)).await;

		let completion = scheduler.schedule(|_| panic!("task should not run after cancellation"));

		timeout(Duration::from_secs(1), scheduler.stop()).await.expect("workers did not exit within 1 second").unwrap();
		assert!(!completion.is_done());
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_cancellation_abandons_pending_but_finishes_claimed() {
		let cancellation_token = CancellationToken::new();
		let scheduler = build_scheduler::<&str>(cancellation_token.clone(), ShutdownPolicy::Abandon);
		scheduler.start(["worker1"]).unwrap();

		let (started_tx, started_rx) = tokio::sync::oneshot::channel();
		let claimed = scheduler.schedule(move |_| {
			let _ = started_tx.send(());
			std::thread::sleep(Duration::from_millis(200));
		});
		let pending = scheduler.schedule(|_| {});

		timeout(Duration::from_secs(1), started_rx).await.unwrap().unwrap();
		cancellation_token.cancel();

		assert_eq!(timeout(Duration::from_secs(1), claimed.wait()).await.unwrap(), TaskOutcome::Completed);
		assert!(timeout(Duration::from_millis(200), pending.wait()).await.is_err());

		scheduler.stop().await.unwrap();
		assert_eq!(scheduler.pending(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_abandon_policy_leaves_queued_tasks() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["worker1"]).unwrap();

		let (started_tx, started_rx) = tokio::sync::oneshot::channel();
		let claimed = scheduler.schedule(move |_| {
			let _ = started_tx.send(());
			std::thread::sleep(Duration::from_millis(100));
		});
		let queued: Vec<Completion> = (0..3).map(|_| scheduler.schedule(|_| {})).collect();

		started_rx.await.unwrap();
		scheduler.stop().await.unwrap();

		assert!(claimed.is_done());
		assert!(queued.iter().all(|completion| !completion.is_done()));
		assert_eq!(scheduler.pending(), 3);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_drain_policy_runs_queued_tasks_before_exit() {
		let scheduler = build_scheduler::<&str>(CancellationToken::new(), ShutdownPolicy::Drain);
		scheduler.start(["worker1"]).unwrap();

		let (started_tx, started_rx) = tokio::sync::oneshot::channel();
		let claimed = scheduler.schedule(move |_| {
			let _ = started_tx.send(());
			std::thread::sleep(Duration::from_millis(100));
		});
		let queued: Vec<Completion> = (0..3).map(|_| scheduler.schedule(|_| {})).collect();

		started_rx.await.unwrap();
		scheduler.stop().await.unwrap();

		assert!(claimed.is_done());
		assert!(queued.iter().all(Completion::is_done));
		assert_eq!(scheduler.pending(), 0);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_cancellation_beats_drain_policy() {
		let cancellation_token = CancellationToken::new();
		let scheduler = build_scheduler::<&str>(cancellation_token.clone(), ShutdownPolicy::Drain);
		scheduler.start(["worker1"]).unwrap();

		let (started_tx, started_rx) = tokio::sync::oneshot::channel();
		let claimed = scheduler.schedule(move |_| {
			let _ = started_tx.send(());
			std::thread::sleep(Duration::from_millis(100));
		});
		let queued: Vec<Completion> = (0..3).map(|_| scheduler.schedule(|_| {})).collect();

		started_rx.await.unwrap();
		cancellation_token.cancel();
		timeout(Duration::from_secs(1), scheduler.stop()).await.unwrap().unwrap();

		assert!(claimed.is_done());
		assert!(queued.iter().all(|completion| !completion.is_done()));
		assert_eq!(scheduler.pending(), 3);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_cancellation_interrupts_running_drain() {
		let cancellation_token = CancellationToken::new();
		let scheduler = build_scheduler::<&str>(cancellation_token.clone(), ShutdownPolicy::Drain);
		scheduler.start(["worker1"]).unwrap();

		let (started_tx, started_rx) = tokio::sync::oneshot::channel();
		let claimed = scheduler.schedule(move |_| {
			let _ = started_tx.send(());
			std::thread::sleep(Duration::from_millis(100));
		});
		let token = cancellation_token.clone();
		let first_drained = scheduler.schedule(move |_| token.cancel());
		let rest: Vec<Completion> = (0..2).map(|_| scheduler.schedule(|_| {})).collect();

		started_rx.await.unwrap();
		timeout(Duration::from_secs(1), scheduler.stop()).await.unwrap().unwrap();

		assert!(claimed.is_done());
		assert_eq!(first_drained.outcome(), Some(TaskOutcome::Completed));
		assert!(rest.iter().all(|completion| !completion.is_done()));
		assert_eq!(scheduler.pending(), 2);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_panicking_task_does_not_shrink_pool() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(["only"]).unwrap();

		let failed = scheduler.schedule(|_| panic!("backend exploded"));
		let outcome = timeout(Duration::from_secs(1), failed.wait()).await.unwrap();
		assert_eq!(
			outcome,
			TaskOutcome::Panicked {
				message: "backend exploded".to_string()
			}
		);

		let ran_on = Arc::new(Mutex::new(None));
		let next = {
			let ran_on = Arc::clone(&ran_on);
			scheduler.schedule(move |worker_id| *ran_on.lock().unwrap() = Some(worker_id))
		};
		assert_eq!(timeout(Duration::from_secs(1), next.wait()).await.unwrap(), TaskOutcome::Completed);
		assert_eq!(*ran_on.lock().unwrap(), Some("only"));

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_generic_worker_id() {
		let scheduler = default_scheduler::<i32>();
		let worker_ids = vec![1, 2];
		scheduler.start(worker_ids.clone()).unwrap();

		let received = Arc::new(Mutex::new(None));
		let completion = {
			let received = Arc::clone(&received);
			scheduler.schedule(move |worker_id| *received.lock().unwrap() = Some(worker_id))
		};

		timeout(Duration::from_secs(1), completion.wait()).await.expect("task was not executed within 1 second");
		let received = received.lock().unwrap().expect("worker id was not recorded");
		assert!(worker_ids.contains(&received));

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_without_workers_tasks_stay_queued() {
		let scheduler = default_scheduler::<&str>();
		scheduler.start(Vec::new()).unwrap();

		let completion = scheduler.schedule(|_| {});
		assert!(timeout(Duration::from_millis(100), completion.wait()).await.is_err());
		assert_eq!(scheduler.pending(), 1);

		scheduler.stop().await.unwrap();
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_metrics_follow_task_outcomes() {
		let metrics = SchedulerMetrics::new().unwrap();
		let scheduler = default_scheduler::<&str>().with_metrics(metrics.clone());
		scheduler.start(["worker1", "worker2"]).unwrap();

		let ok = scheduler.schedule(|_| {});
		let failed = scheduler.schedule(|_| panic!("boom"));
		ok.wait().await;
		failed.wait().await;

		assert_eq!(metrics.tasks_scheduled.get(), 2);
		assert_eq!(metrics.tasks_completed.get(), 1);
		assert_eq!(metrics.tasks_panicked.get(), 1);

		scheduler.stop().await.unwrap();
		assert_eq!(metrics.active_workers.get(), 0);
	}

	#[test]
	fn test_panic_message_extraction() {
		assert_eq!(panic_message(&"static"), "static");
		assert_eq!(panic_message(&String::from("owned")), "owned");
		assert_eq!(panic_message(&42_u8), "non-string panic payload");
	}
}
