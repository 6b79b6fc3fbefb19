use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// FIFO hand-off point between producers and workers.
///
/// `pop` must be cancel-safe: a pending `pop` that is dropped before it
/// resolves may not take an item out of the queue.
#[async_trait]
pub trait TaskQueue<T: Send>: Send + Sync {
	/// Appends to the tail. Never blocks and never rejects.
	fn push(&self, item: T);

	/// Waits until an item is available and removes the head.
	async fn pop(&self) -> T;

	/// Removes the head if there is one, without waiting.
	fn try_pop(&self) -> Option<T>;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Unbounded blocking queue.
///
/// A single mutex guards the buffer. Waiters park on a [`Notify`]; every
/// push releases one of them (or leaves a permit when nobody is parked yet),
/// and a woken waiter re-checks the buffer under the lock before taking
/// anything, so there is neither a missed wakeup nor a busy loop.
///
/// There is no backpressure. Callers that need a bound must apply it upstream.
pub struct UnboundedQueue<T> {
	items: Mutex<VecDeque<T>>,
	wake: Notify,
}

impl<T> Default for UnboundedQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> UnboundedQueue<T> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			items: Mutex::new(VecDeque::new()),
			wake: Notify::new(),
		}
	}

	// The buffer is never left half-updated, so a poisoned lock is still usable.
	fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
		self.items.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[async_trait]
impl<T: Send> TaskQueue<T> for UnboundedQueue<T> {
	fn push(&self, item: T) {
		self.lock().push_back(item);
		self.wake.notify_one();
	}

	async fn pop(&self) -> T {
		loop {
			let notified = self.wake.notified();

			let head = self.lock().pop_front();
			if let Some(item) = head {
				return item;
			}

			notified.await;
		}
	}

	fn try_pop(&self) -> Option<T> {
		self.lock().pop_front()
	}

	fn len(&self) -> usize {
		self.lock().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;
	use std::sync::Arc;
	use std::time::Duration;
	use tokio::time::timeout;

	#[tokio::test]
	async fn test_sequential_fifo() {
		let queue = UnboundedQueue::new();

		queue.push(1);
		queue.push(2);
		queue.push(3);

		assert_eq!(queue.pop().await, 1);
		assert_eq!(queue.pop().await, 2);
		assert_eq!(queue.pop().await, 3);
		assert!(queue.is_empty());
	}

	#[tokio::test]
	async fn test_try_pop_and_len() {
		let queue = UnboundedQueue::new();
		assert_eq!(queue.try_pop(), None);

		queue.push("a");
		queue.push("b");
		assert_eq!(queue.len(), 2);

		assert_eq!(queue.try_pop(), Some("a"));
		assert_eq!(queue.len(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_push_then_pop() {
		let queue = Arc::new(UnboundedQueue::new());
		let total = 1000;

		let mut pushers = Vec::new();
		for i in 0..total {
			let queue = Arc::clone(&queue);
			pushers.push(tokio::spawn(async move { queue.push(i) }));
		}
		for pusher in pushers {
			pusher.await.unwrap();
		}

		let mut poppers = Vec::new();
		for _ in 0..total {
			let queue = Arc::clone(&queue);
			poppers.push(tokio::spawn(async move { queue.pop().await }));
		}

		let mut seen = HashSet::new();
		for popper in poppers {
			let value = timeout(Duration::from_secs(5), popper).await.unwrap().unwrap();
			assert!(seen.insert(value), "duplicate value {value}");
		}

		assert_eq!(seen.len(), total);
		assert!(queue.is_empty());
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_poppers_wait_for_pushes() {
		let queue = Arc::new(UnboundedQueue::new());
		let total = 200;

		let mut poppers = Vec::new();
		for _ in 0..total {
			let queue = Arc::clone(&queue);
			poppers.push(tokio::spawn(async move { queue.pop().await }));
		}

		tokio::time::sleep(Duration::from_millis(20)).await;
		for i in 0..total {
			queue.push(i);
		}

		let mut seen = HashSet::new();
		for popper in poppers {
			let value = timeout(Duration::from_secs(5), popper).await.expect("popper was never woken").unwrap();
			assert!(seen.insert(value));
		}
		assert_eq!(seen.len(), total);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_interleaved_producer_consumer_preserves_order() {
		let queue = Arc::new(UnboundedQueue::new());
		let total = 10_000;

		let consumer = {
			let queue = Arc::clone(&queue);
			tokio::spawn(async move {
				let mut received = Vec::with_capacity(total);
				for _ in 0..total {
					received.push(queue.pop().await);
				}
				received
			})
		};

		let producer = {
			let queue = Arc::clone(&queue);
			tokio::spawn(async move {
				for i in 0..total {
					queue.push(i);
					if i % 100 == 0 {
						tokio::task::yield_now().await;
					}
				}
			})
		};

		producer.await.unwrap();
		let received = timeout(Duration::from_secs(10), consumer).await.unwrap().unwrap();

		assert_eq!(received, (0..total).collect::<Vec<_>>());
	}

	#[tokio::test]
	async fn test_pop_blocks_on_empty_queue() {
		let queue: UnboundedQueue<u8> = UnboundedQueue::new();

		assert!(timeout(Duration::from_millis(50), queue.pop()).await.is_err());
	}

	#[tokio::test]
	async fn test_dropped_pop_does_not_lose_items() {
		let queue = Arc::new(UnboundedQueue::new());

		let abandoned = {
			let queue = Arc::clone(&queue);
			tokio::spawn(async move { queue.pop().await })
		};
		tokio::task::yield_now().await;
		abandoned.abort();
		let _ = abandoned.await;

		queue.push(7);
		assert_eq!(timeout(Duration::from_secs(1), queue.pop()).await.unwrap(), 7);
	}
}
