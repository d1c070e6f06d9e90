//! Bounded pool of renderer sessions.
//!
//! Every render holds a semaphore permit for as long as its session lives, so
//! at most `capacity` renderers run at once. Sessions are wrapped in a
//! [`RenderLease`] that releases the session and then the permit when dropped,
//! which covers success, errors and timeouts alike.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::engine::{PageConfig, RenderError};
use super::traits::{RenderEngine, RenderSession};
use super::MarkupDocument;

pub struct RenderPool {
    engine: Arc<dyn RenderEngine>,
    permits: Arc<Semaphore>,
    capacity: usize,
    page: PageConfig,
    timeout: Duration,
}

impl RenderPool {
    pub fn new(engine: Arc<dyn RenderEngine>, capacity: usize, timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            engine,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            page: PageConfig::fir(),
            timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a live session.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for a free slot and launch a session in it.
    pub async fn acquire(&self) -> Result<RenderLease, RenderError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RenderError::PoolClosed)?;
        let session = self.engine.launch().await?;
        Ok(RenderLease {
            session,
            _permit: permit,
        })
    }

    /// Render one markup document to PDF within the configured time limit.
    /// Waiting for a slot counts against the limit.
    pub async fn render(&self, markup: &MarkupDocument) -> Result<Vec<u8>, RenderError> {
        match tokio::time::timeout(self.timeout, self.render_in_lease(markup)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        }
    }

    async fn render_in_lease(&self, markup: &MarkupDocument) -> Result<Vec<u8>, RenderError> {
        let mut lease = self.acquire().await?;
        lease.load(markup).await?;
        lease.print(&self.page).await
    }
}

/// A live session plus the pool slot it occupies.
pub struct RenderLease {
    // Declared before the permit so the session is torn down first.
    session: Box<dyn RenderSession>,
    _permit: OwnedSemaphorePermit,
}

impl RenderLease {
    pub async fn load(&mut self, markup: &MarkupDocument) -> Result<(), RenderError> {
        self.session.load(markup).await
    }

    pub async fn print(&mut self, page: &PageConfig) -> Result<Vec<u8>, RenderError> {
        self.session.print(page).await
    }
}

impl Drop for RenderLease {
    fn drop(&mut self) {
        log::debug!("Renderer lease released");
    }
}
