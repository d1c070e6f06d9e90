//! Seams of the generation pipeline: the clock the composer reads and the
//! rendering engine the pool drives.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::engine::{PageConfig, RenderError};
use super::MarkupDocument;

/// Source of the "generated on" date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Factory for renderer sessions.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Acquire a fresh renderer session.
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One live renderer. Dropping the session releases everything it holds.
#[async_trait]
pub trait RenderSession: Send {
    /// Load the markup document into the rendering surface.
    async fn load(&mut self, markup: &MarkupDocument) -> Result<(), RenderError>;

    /// Print the loaded document to PDF bytes.
    async fn print(&mut self, page: &PageConfig) -> Result<Vec<u8>, RenderError>;
}
