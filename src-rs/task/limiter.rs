use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::result::AnalyzerError;

/// Fixed-capacity admission gate. A slot is returned when its permit drops.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AnalyzerError> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AnalyzerError::Execution("plugin stopped before analysis started".to_string()))
    }

    /// Fails every current and future `acquire`. Held permits stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
