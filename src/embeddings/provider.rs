use super::Embedder;
use crate::error::{DxError, Result};
use serde::Deserialize;

pub enum RemoteBackend {
    OpenAI { api_key: String, model: String },
    Ollama { endpoint: String, model: String },
}

/// Embedding service reached over HTTP.
///
/// Requests run on a private current-thread runtime so callers keep the
/// synchronous [`Embedder`] interface.
pub struct RemoteEmbedder {
    backend: RemoteBackend,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl RemoteEmbedder {
    pub fn ollama(endpoint: &str, model: &str) -> Result<Self> {
        Self::new(RemoteBackend::Ollama {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn openai(api_key: String, model: &str) -> Result<Self> {
        Self::new(RemoteBackend::OpenAI {
            api_key,
            model: model.to_string(),
        })
    }

    fn new(backend: RemoteBackend) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DxError::Config(format!("tokio runtime: {}", e)))?;

        Ok(Self {
            backend,
            client: reqwest::Client::new(),
            runtime,
        })
    }

    /// Generate embeddings for a batch of texts
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match &self.backend {
            RemoteBackend::OpenAI { api_key, model } => {
                self.embed_openai(texts, api_key, model).await
            }
            RemoteBackend::Ollama { endpoint, model } => {
                self.embed_ollama(texts, endpoint, model).await
            }
        }
    }

    async fn embed_openai(
        &self,
        texts: &[String],
        api_key: &str,
        model: &str,
    ) -> Result<Vec<Vec<f32>>> {
        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|e| DxError::ModelUnavailable(format!("OpenAI unreachable: {}", e)))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DxError::ModelUnavailable(format!("OpenAI API error: {}", text)));
        }

        let result: EmbeddingResponse = response.json().await?;
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_ollama(
        &self,
        texts: &[String],
        endpoint: &str,
        model: &str,
    ) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::new();

        for text in texts {
            let response = self
                .client
                .post(format!("{}/api/embeddings", endpoint))
                .json(&serde_json::json!({
                    "model": model,
                    "prompt": text,
                }))
                .send()
                .await
                .map_err(|e| {
                    DxError::ModelUnavailable(format!("Ollama unreachable at {}: {}", endpoint, e))
                })?;

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(DxError::ModelUnavailable(format!("Ollama API error: {}", text)));
            }

            let result: serde_json::Value = response.json().await?;
            let embedding: Vec<f32> = result
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| DxError::Encoding("Invalid Ollama embedding response".into()))?
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();

            embeddings.push(embedding);
        }

        Ok(embeddings)
    }
}

impl Embedder for RemoteEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self
            .runtime
            .block_on(self.embed_batch(&[text.to_string()]))?;
        batch
            .into_iter()
            .next()
            .ok_or_else(|| DxError::Encoding("No embedding returned".into()))
    }

    fn dimensions(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        match self.backend {
            RemoteBackend::OpenAI { .. } => "openai",
            RemoteBackend::Ollama { .. } => "ollama",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_endpoint_trailing_slash_trimmed() {
        let embedder = RemoteEmbedder::ollama("http://localhost:11434/", "nomic-embed-text").unwrap();
        match &embedder.backend {
            RemoteBackend::Ollama { endpoint, model } => {
                assert_eq!(endpoint, "http://localhost:11434");
                assert_eq!(model, "nomic-embed-text");
            }
            _ => panic!("expected ollama backend"),
        }
        assert_eq!(embedder.name(), "ollama");
        assert_eq!(embedder.dimensions(), None);
    }

    #[test]
    fn test_unreachable_ollama_is_model_unavailable() {
        // Port 9 (discard) is never an Ollama server
        let embedder = RemoteEmbedder::ollama("http://127.0.0.1:9", "m").unwrap();
        let err = embedder.embed("fever").unwrap_err();
        assert!(matches!(err, DxError::ModelUnavailable(_)));
    }
}
