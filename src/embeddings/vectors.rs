//! Static word-vector model.
//!
//! Reads the plain-text format shared by GloVe and fastText: one
//! `word v1 v2 ... vD` row per line, with an optional `count dim` header.
//! A text's embedding is the mean of its in-vocabulary token vectors, so
//! the same text always maps to the same vector.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use super::Embedder;
use crate::error::{DxError, Result};

#[derive(Debug)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dims: usize,
}

impl WordVectors {
    /// Load a model file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DxError::ModelUnavailable(format!(
                "no word-vector model at {} (run `symptom-dx fetch-model` or set SYMPTOM_DX_MODEL)",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DxError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let model = Self::parse(&content)?;

        tracing::info!(
            path = %path.display(),
            words = model.len(),
            dims = model.dims,
            "loaded word-vector model"
        );
        Ok(model)
    }

    /// Parse model text
    pub fn parse(content: &str) -> Result<Self> {
        let mut vectors = HashMap::new();
        let mut dims = 0usize;

        for (idx, line) in content.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let rest: Vec<&str> = fields.collect();

            // fastText `.vec` header: "<count> <dim>"
            if idx == 0
                && rest.len() == 1
                && word.parse::<usize>().is_ok()
                && rest[0].parse::<usize>().is_ok()
            {
                continue;
            }

            let values = rest
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|_| {
                    DxError::ModelUnavailable(format!("malformed vector on line {}", idx + 1))
                })?;

            if values.is_empty() {
                return Err(DxError::ModelUnavailable(format!(
                    "word '{}' on line {} has no components",
                    word,
                    idx + 1
                )));
            }
            if dims == 0 {
                dims = values.len();
            } else if values.len() != dims {
                return Err(DxError::ModelUnavailable(format!(
                    "line {} has {} components, expected {}",
                    idx + 1,
                    values.len(),
                    dims
                )));
            }

            vectors.insert(word.to_lowercase(), values);
        }

        if vectors.is_empty() {
            return Err(DxError::ModelUnavailable(
                "word-vector model contains no vectors".into(),
            ));
        }

        Ok(Self { vectors, dims })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(&word.to_lowercase())
    }
}

impl Embedder for WordVectors {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dims];
        let mut hits = 0usize;

        for token in tokenize(text) {
            if let Some(vector) = self.vectors.get(&token) {
                for (acc, v) in sum.iter_mut().zip(vector) {
                    *acc += v;
                }
                hits += 1;
            }
        }

        // Unknown-only text stays the zero vector
        if hits > 0 {
            let n = hits as f32;
            sum.iter_mut().for_each(|x| *x /= n);
        }
        Ok(sum)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dims)
    }

    fn name(&self) -> &str {
        "word-vectors"
    }
}

/// Lower-cased word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    static TOKEN_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| regex::Regex::new(r"[\p{L}\p{N}]+").expect("static regex"));
    re.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
