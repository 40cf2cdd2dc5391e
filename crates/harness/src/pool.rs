//! Bounded worker pool for test tasks

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

type Queued<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Fixed-size pool that runs tasks on the current tokio runtime.
///
/// Tasks are spawned in submission order as permits free up; results come
/// back in completion order through [`WorkerPool::next`]. Dropping the pool
/// aborts whatever is still in flight.
pub struct WorkerPool<T> {
    permits: Arc<Semaphore>,
    queue: VecDeque<Queued<T>>,
    tasks: JoinSet<T>,
    size: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Create a pool running at most `size` tasks at once (minimum one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            queue: VecDeque::new(),
            tasks: JoinSet::new(),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of submitted tasks not yet collected
    pub fn pending(&self) -> usize {
        self.queue.len() + self.tasks.len()
    }

    pub fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.queue.push_back(Box::pin(task));
        self.admit();
    }

    /// Next finished task, or `None` once everything has been collected
    pub async fn next(&mut self) -> Option<Result<T, tokio::task::JoinError>> {
        self.admit();
        let joined = self.tasks.join_next().await;
        // The finished task released its permit, so the queue can move up
        self.admit();
        joined
    }

    /// Spawn queued tasks from the front while permits are free
    fn admit(&mut self) {
        while !self.queue.is_empty() {
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                break;
            };
            let Some(task) = self.queue.pop_front() else {
                break;
            };
            self.tasks.spawn(async move {
                let _permit = permit;
                task.await
            });
        }
    }
}
