use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Bounded set of concurrently running tasks
///
/// A task is only spawned once it holds a semaphore permit, and the permit is
/// released when the task's future completes.
pub struct WorkerPool<T> {
    permits: Arc<Semaphore>,
    tasks: JoinSet<T>,
    capacity: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            tasks: JoinSet::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    pub fn is_saturated(&self) -> bool {
        self.permits.available_permits() == 0
    }

    /// Waits for a free slot, then spawns `task`
    pub async fn submit<F>(&mut self, task: F) -> Result<(), AcquireError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = self.permits.clone().acquire_owned().await?;
        self.tasks.spawn(async move {
            let output = task.await;
            drop(permit);
            output
        });
        Ok(())
    }

    /// Next finished task, or None once every spawned task has been joined
    pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    /// Tasks spawned and not yet joined
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
