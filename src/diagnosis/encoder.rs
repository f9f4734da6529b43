use crate::embeddings::Embedder;
use crate::error::{DxError, Result};

/// Turns symptom text into an embedding, rejecting empty input and degenerate vectors
pub struct Encoder<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> Encoder<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DxError::InvalidInput("symptom text is empty".into()));
        }

        tracing::debug!(symptom = text, backend = self.embedder.name(), "encoding symptom");
        let vector = self.embedder.embed(text)?;

        if vector.is_empty() {
            return Err(DxError::Encoding(format!("'{}' produced an empty embedding", text)));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(DxError::Encoding(format!(
                "'{}' produced a non-finite embedding",
                text
            )));
        }
        if vector.iter().all(|x| *x == 0.0) {
            return Err(DxError::Encoding(format!(
                "'{}' produced an all-zero embedding",
                text
            )));
        }

        Ok(vector)
    }
}
