use std::fmt;
use tokio::sync::watch;

/// How a scheduled task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
	/// The task body returned normally.
	Completed,
	/// The task body panicked. The worker that ran it keeps serving.
	Panicked { message: String },
	/// The task was destroyed without ever running, i.e. the queue holding it
	/// was dropped.
	Dropped,
}

impl fmt::Display for TaskOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Completed => write!(f, "completed"),
			Self::Panicked { message } => write!(f, "panicked: {message}"),
			Self::Dropped => write!(f, "dropped before execution"),
		}
	}
}

/// One-shot completion signal for a single scheduled task.
///
/// Resolves exactly once, after the task body has returned. Cloning gives
/// another reader of the same signal; it is never shared between tasks.
#[derive(Debug, Clone)]
pub struct Completion {
	rx: watch::Receiver<Option<TaskOutcome>>,
}

/// Writer side, owned by the task wrapper. Dropping it unresolved marks the
/// task as [`TaskOutcome::Dropped`].
#[derive(Debug)]
pub(crate) struct Completer {
	tx: Option<watch::Sender<Option<TaskOutcome>>>,
}

pub(crate) fn completion() -> (Completer, Completion) {
	let (tx, rx) = watch::channel(None);
	(Completer { tx: Some(tx) }, Completion { rx })
}

impl Completer {
	pub(crate) fn complete(mut self, outcome: TaskOutcome) {
		if let Some(tx) = self.tx.take() {
			tx.send_replace(Some(outcome));
		}
	}
}

impl Drop for Completer {
	fn drop(&mut self) {
		if let Some(tx) = self.tx.take() {
			tx.send_replace(Some(TaskOutcome::Dropped));
		}
	}
}

impl Completion {
	/// Waits for this exact task to finish.
	///
	/// A task that is never claimed by a worker never resolves, so callers
	/// that cannot tolerate that should race this against a timeout.
	pub async fn wait(&self) -> TaskOutcome {
		let mut rx = self.rx.clone();
		// The guard borrows `rx`, so it is released before `rx` goes out of scope.
		let outcome = rx.wait_for(Option::is_some).await.map(|outcome| outcome.clone());
		outcome.ok().flatten().unwrap_or(TaskOutcome::Dropped)
	}

	#[must_use]
	pub fn is_done(&self) -> bool {
		self.rx.borrow().is_some()
	}

	#[must_use]
	pub fn outcome(&self) -> Option<TaskOutcome> {
		self.rx.borrow().clone()
	}
}
