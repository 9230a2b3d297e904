use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvoiceError>;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("invoice store {path} is corrupt: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("template '{0}' not found (run `factura templates` to list saved templates)")]
    TemplateNotFound(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid amount '{0}': expected a non-negative number")]
    InvalidAmount(String),

    #[error("'typst' is not installed; install it first (e.g. `brew install typst`)")]
    RendererUnavailable,

    #[error("PDF compilation failed for {}", .0.display())]
    CompileFailed(PathBuf),

    #[error("template error: {0}")]
    Render(#[from] tera::Error),

    #[error("store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
