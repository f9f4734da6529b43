pub mod bootstrap;
pub mod provider;
pub mod vectors;

pub use provider::RemoteEmbedder;
pub use vectors::WordVectors;

use crate::config::{Config, EmbedderKind};
use crate::error::{DxError, Result};

/// Text -> dense vector. Implementations must be deterministic for a given input.
pub trait Embedder: Send + Sync {
    /// Embed a single piece of text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension, when known before the first call
    fn dimensions(&self) -> Option<usize>;

    /// Short backend label for logs
    fn name(&self) -> &str;
}

/// Cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Score `query` against every row in one pass.
///
/// Unlike [`cosine_similarity`], a width mismatch or a non-finite score is an
/// error here: callers rely on one score per row, in row order.
pub fn similarities<'a, I>(query: &[f32], rows: I) -> Result<Vec<f32>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != query.len() {
                return Err(DxError::Computation(format!(
                    "row {} has width {} but the query has width {}",
                    i,
                    row.len(),
                    query.len()
                )));
            }
            let score = cosine_similarity(query, row);
            if !score.is_finite() {
                return Err(DxError::Computation(format!(
                    "similarity against row {} is not a finite number",
                    i
                )));
            }
            Ok(score)
        })
        .collect()
}

/// Construct the configured embedding backend.
///
/// With `allow_fetch`, a missing local model is bootstrapped first (one-shot
/// download); otherwise a missing model is reported as unavailable.
pub fn load_embedder(config: &Config, allow_fetch: bool) -> Result<Box<dyn Embedder>> {
    match config.embedder {
        EmbedderKind::Vectors => {
            if allow_fetch {
                bootstrap::ensure_model(&config.model, false)?;
            }
            Ok(Box::new(WordVectors::load(&config.model.path)?))
        }
        EmbedderKind::Ollama => Ok(Box::new(RemoteEmbedder::ollama(
            &config.remote.ollama_endpoint,
            &config.remote.ollama_model,
        )?)),
        EmbedderKind::OpenAi => {
            let key = config.remote.openai_api_key.clone().ok_or_else(|| {
                DxError::ModelUnavailable("OPENAI_API_KEY not set".into())
            })?;
            Ok(Box::new(RemoteEmbedder::openai(key, &config.remote.openai_model)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [3.0, 4.0];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn test_cosine_orthogonal_and_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_similarities_keeps_row_order() {
        let rows: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![-1.0, 0.0]];
        let scores = similarities(&[1.0, 0.0], rows.iter().map(|r| r.as_slice())).unwrap();
        assert_eq!(scores, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn test_similarities_rejects_width_mismatch() {
        let rows: Vec<Vec<f32>> = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];
        let err = similarities(&[1.0, 0.0], rows.iter().map(|r| r.as_slice())).unwrap_err();
        assert!(matches!(err, DxError::Computation(_)));
    }

    #[test]
    fn test_similarities_rejects_nan() {
        let rows: Vec<Vec<f32>> = vec![vec![f32::NAN, 1.0]];
        let err = similarities(&[1.0, 1.0], rows.iter().map(|r| r.as_slice())).unwrap_err();
        assert!(matches!(err, DxError::Computation(_)));
    }
}
