use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::sync::SemaphorePermit;

/// Bounds the number of resolver calls in flight for one request.
///
/// Only resolver invocations take a permit. Serialization and list fan-out do not.
#[derive(Clone, Debug)]
pub(crate) struct Limiter {
    semaphore: Arc<Semaphore>,
}

impl Limiter {
    pub(crate) fn new(max_parallelism: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_parallelism.max(1))),
        }
    }

    /// Waits for a permit. Returns `None` only if the pool was closed, which never happens.
    pub(crate) async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.ok()
    }

    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
