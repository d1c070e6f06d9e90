//! Typst rendering engine.
//!
//! Each session owns a private temporary workspace. Loading writes the
//! composed markup into it, printing wraps that markup with the page setup and
//! runs the Typst compiler, and dropping the session removes the workspace and
//! kills a compiler that is still running.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;

use super::traits::{RenderEngine, RenderSession};
use super::MarkupDocument;

const DOCUMENT_FILE: &str = "document.typ";
const MAIN_FILE: &str = "main.typ";
const OUTPUT_FILE: &str = "output.pdf";
const MAX_STDERR_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    A4,
}

impl PaperSize {
    fn typst_name(&self) -> &'static str {
        match self {
            Self::A4 => "a4",
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

/// Page geometry handed to the renderer at print time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    pub paper: PaperSize,
    pub margins: Margins,
    pub print_background: bool,
}

impl PageConfig {
    /// A4, 20mm top and bottom, 15mm left and right, backgrounds printed.
    pub fn fir() -> Self {
        Self {
            paper: PaperSize::A4,
            margins: Margins {
                top_mm: 20.0,
                bottom_mm: 20.0,
                left_mm: 15.0,
                right_mm: 15.0,
            },
            print_background: true,
        }
    }

    /// The `#set page` rule expressing this geometry.
    pub fn typst_page_rule(&self) -> String {
        let m = &self.margins;
        format!(
            "#set page(paper: \"{}\", margin: (top: {}mm, bottom: {}mm, left: {}mm, right: {}mm))",
            self.paper.typst_name(),
            m.top_mm,
            m.bottom_mm,
            m.left_mm,
            m.right_mm,
        )
    }

    /// Compile input read by the document prelude to toggle fills.
    pub fn background_input(&self) -> String {
        format!("print-background={}", self.print_background)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::fir()
    }
}

/// Broad failure class, stable enough for logs and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFailureKind {
    Startup,
    Load,
    Print,
    Timeout,
}

impl RenderFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Load => "load",
            Self::Print => "print",
            Self::Timeout => "timeout",
        }
    }
}

/// Errors that can occur while turning markup into a PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create renderer workspace: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("failed to start Typst compiler: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("renderer pool is closed")]
    PoolClosed,
    #[error("failed to write Typst source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("print requested before a document was loaded")]
    NotLoaded,
    #[error("Typst compiler exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("renderer produced an empty document")]
    EmptyOutput,
    #[error("rendering timed out after {0:?}")]
    Timeout(Duration),
}

impl RenderError {
    pub fn kind(&self) -> RenderFailureKind {
        match self {
            Self::Workspace(_) | Self::Spawn(_) | Self::PoolClosed => RenderFailureKind::Startup,
            Self::WriteSource(_) | Self::NotLoaded => RenderFailureKind::Load,
            Self::Exit { .. } | Self::ReadPdf(_) | Self::EmptyOutput => RenderFailureKind::Print,
            Self::Timeout(_) => RenderFailureKind::Timeout,
        }
    }
}

/// Engine that renders through the `typst` command line compiler.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    binary: PathBuf,
    font_paths: Vec<PathBuf>,
}

impl TypstRenderEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            font_paths: Vec::new(),
        }
    }

    pub fn with_font_paths(mut self, font_paths: Vec<PathBuf>) -> Self {
        self.font_paths = font_paths;
        self
    }
}

#[async_trait]
impl RenderEngine for TypstRenderEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        let workspace = tempfile::Builder::new()
            .prefix("fir-render-")
            .tempdir()
            .map_err(RenderError::Workspace)?;
        log::debug!("Renderer workspace created at {}", workspace.path().display());

        Ok(Box::new(TypstSession {
            binary: self.binary.clone(),
            font_paths: self.font_paths.clone(),
            workspace,
            loaded: false,
        }))
    }
}

struct TypstSession {
    binary: PathBuf,
    font_paths: Vec<PathBuf>,
    workspace: TempDir,
    loaded: bool,
}

#[async_trait]
impl RenderSession for TypstSession {
    async fn load(&mut self, markup: &MarkupDocument) -> Result<(), RenderError> {
        let path = self.workspace.path().join(DOCUMENT_FILE);
        fs::write(&path, markup.as_str())
            .await
            .map_err(RenderError::WriteSource)?;
        self.loaded = true;
        Ok(())
    }

    async fn print(&mut self, page: &PageConfig) -> Result<Vec<u8>, RenderError> {
        if !self.loaded {
            return Err(RenderError::NotLoaded);
        }

        let dir = self.workspace.path();
        let main = format!("{}\n#include \"{}\"\n", page.typst_page_rule(), DOCUMENT_FILE);
        fs::write(dir.join(MAIN_FILE), main)
            .await
            .map_err(RenderError::WriteSource)?;

        let mut command = Command::new(&self.binary);
        command
            .arg("compile")
            .arg("--root")
            .arg(dir)
            .arg("--input")
            .arg(page.background_input());
        for font_path in &self.font_paths {
            command.arg("--font-path").arg(font_path);
        }
        command
            .arg(MAIN_FILE)
            .arg(OUTPUT_FILE)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command.output().await.map_err(RenderError::Spawn)?;
        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .trim()
                .chars()
                .take(MAX_STDERR_CHARS)
                .collect();
            return Err(RenderError::Exit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let pdf = fs::read(dir.join(OUTPUT_FILE))
            .await
            .map_err(RenderError::ReadPdf)?;
        if pdf.is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(pdf)
    }
}

impl Drop for TypstSession {
    fn drop(&mut self) {
        log::debug!(
            "Releasing renderer workspace {}",
            self.workspace.path().display()
        );
    }
}
