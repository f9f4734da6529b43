// Library interface for symptom-dx

pub mod action;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diagnosis;
pub mod embeddings;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use context::DiagnosisContext;
pub use error::{DxError, Result};
