use thiserror::Error;

#[derive(Error, Debug)]
pub enum DxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl DxError {
    /// Stable short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DxError::InvalidInput(_) => "invalid_input",
            DxError::ModelUnavailable(_) => "model_unavailable",
            DxError::Encoding(_) => "encoding",
            DxError::CatalogLoad(_) => "catalog_load",
            DxError::Computation(_) => "computation",
            DxError::Io(_) => "io",
            DxError::Json(_) => "json",
            DxError::Http(_) => "http",
            DxError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DxError>;
