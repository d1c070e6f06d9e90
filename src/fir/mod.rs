//! FIR module - validation, composition and rendering of First Information
//! Reports.
//!
//! A request flows through:
//! - `validation` - raw JSON to a normalized [`IncidentRecord`]
//! - `composer` - record to a self-contained Typst [`MarkupDocument`]
//! - `pool` / `engine` - bounded Typst renderer sessions producing PDF bytes
//! - `handlers` - actix-web delivery as a PDF attachment

pub mod catalog;
pub mod common;
pub mod composer;
pub mod engine;
pub mod handlers;
pub mod models;
pub mod pool;
pub mod traits;
pub mod validation;

pub use common::{FixedClock, SystemClock};
pub use composer::FirComposer;
pub use engine::{PageConfig, RenderError, RenderFailureKind, TypstRenderEngine};
pub use handlers::{config, FirState};
pub use models::{Accused, Charge, ChargeCode, Complainant, Incident, IncidentRecord};
pub use pool::{RenderLease, RenderPool};
pub use traits::{Clock, RenderEngine, RenderSession};
pub use validation::{validate, ValidationError, ValidationErrorKind};

use thiserror::Error;

/// Typst source ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument(String);

impl MarkupDocument {
    pub fn new(source: String) -> Self {
        Self(source)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors that can end a generation request.
#[derive(Debug, Error)]
pub enum FirError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to render FIR: {0}")]
    Render(#[from] RenderError),
}
