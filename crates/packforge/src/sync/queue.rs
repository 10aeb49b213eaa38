//! Task queue abstraction for per-ref sync tasks.
//!
//! The orchestrator hands the queue a batch of already-built futures and
//! waits for all of them. The default implementation runs them on the
//! tokio runtime behind a semaphore; tests substitute a serial queue to
//! get deterministic ordering.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Executes a batch of tasks and waits for all of them to settle.
///
/// Tasks are infallible at this level; per-ref outcomes are recorded
/// through the shared run progress, never returned.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn run_all(&self, tasks: Vec<BoxFuture<'static, ()>>);
}

/// Concurrent queue on the tokio runtime, bounded by a semaphore.
pub struct TokioTaskQueue {
    concurrency: usize,
}

impl TokioTaskQueue {
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

#[async_trait]
impl TaskQueue for TokioTaskQueue {
    async fn run_all(&self, tasks: Vec<BoxFuture<'static, ()>>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for task in tasks {
            let semaphore = semaphore.clone();
            set.spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // if the queue itself is torn down.
                let _permit = semaphore.acquire_owned().await;
                task.await;
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Sync task panicked");
            }
        }
    }
}

/// Runs tasks one at a time, in order. Test-only determinism.
pub struct SerialTaskQueue;

#[async_trait]
impl TaskQueue for SerialTaskQueue {
    async fn run_all(&self, tasks: Vec<BoxFuture<'static, ()>>) {
        for task in tasks {
            task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures::FutureExt;

    use super::*;

    fn counting_tasks(counter: &Arc<AtomicUsize>, n: usize) -> Vec<BoxFuture<'static, ()>> {
        (0..n)
            .map(|_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                .boxed()
            })
            .collect()
    }

    #[tokio::test]
    async fn tokio_queue_runs_every_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let queue = TokioTaskQueue::new(4);
        queue.run_all(counting_tasks(&counter, 25)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let queue = TokioTaskQueue::new(0);
        queue.run_all(counting_tasks(&counter, 3)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn serial_queue_preserves_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<BoxFuture<'static, ()>> = (0..5)
            .map(|i| {
                let order = order.clone();
                async move {
                    order.lock().expect("lock should not be poisoned").push(i);
                }
                .boxed()
            })
            .collect();

        SerialTaskQueue.run_all(tasks).await;
        assert_eq!(
            *order.lock().expect("lock should not be poisoned"),
            vec![0, 1, 2, 3, 4]
        );
    }
}
