use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DxError, Result};

/// Cosine similarity a catalog symptom must exceed to be flagged
pub const DEFAULT_SYMPTOM_THRESHOLD: f32 = 0.85;
/// Cosine similarity an illness must exceed for an affirmative diagnosis
pub const DEFAULT_DIAGNOSIS_THRESHOLD: f32 = 0.5;

pub const DEFAULT_DATA_DIR: &str = "input_data";
pub const SYMPTOM_CATALOG_FILE: &str = "symptoms.json";
pub const ILLNESS_CATALOG_FILE: &str = "diagnosis_data.json";
pub const MODEL_FILE: &str = "word_vectors.txt";

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Symptom-catalog match cutoff (strict `>`)
    pub symptom: f32,
    /// Illness-catalog confidence cutoff (strict `>`)
    pub diagnosis: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            symptom: DEFAULT_SYMPTOM_THRESHOLD,
            diagnosis: DEFAULT_DIAGNOSIS_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("symptom", self.symptom), ("diagnosis", self.diagnosis)] {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(DxError::Config(format!(
                    "{} threshold must be a number in [-1, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Which embedding backend encodes symptom text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Local static word-vector file
    Vectors,
    Ollama,
    OpenAi,
}

impl FromStr for EmbedderKind {
    type Err = DxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vectors" | "word-vectors" | "local" => Ok(Self::Vectors),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(DxError::Config(format!("Unknown embedder: {}", other))),
        }
    }
}

/// Where the local word-vector model lives and how to bootstrap it
#[derive(Debug, Clone)]
pub struct ModelSource {
    pub path: PathBuf,
    /// Fetched once when `path` is missing and fetching is allowed
    pub url: Option<String>,
    /// Expected hex SHA-256 of the fetched bundle
    pub sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symptom_catalog: PathBuf,
    pub illness_catalog: PathBuf,
    pub embedder: EmbedderKind,
    pub model: ModelSource,
    pub remote: RemoteSettings,
    pub thresholds: Thresholds,
}

impl Config {
    /// Load from `SYMPTOM_DX_*` environment variables, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env in production, maps in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("SYMPTOM_DX_DATA_DIR")
            .map(|d| expand_path(&d))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let symptom_catalog = get("SYMPTOM_DX_SYMPTOMS")
            .map(|p| expand_path(&p))
            .unwrap_or_else(|| data_dir.join(SYMPTOM_CATALOG_FILE));
        let illness_catalog = get("SYMPTOM_DX_ILLNESSES")
            .map(|p| expand_path(&p))
            .unwrap_or_else(|| data_dir.join(ILLNESS_CATALOG_FILE));

        let embedder = match get("SYMPTOM_DX_EMBEDDER") {
            Some(kind) => kind.parse()?,
            None => EmbedderKind::Vectors,
        };

        let model = ModelSource {
            path: get("SYMPTOM_DX_MODEL")
                .map(|p| expand_path(&p))
                .unwrap_or_else(|| default_model_path(&data_dir)),
            url: get("SYMPTOM_DX_MODEL_URL"),
            sha256: get("SYMPTOM_DX_MODEL_SHA256").map(|s| s.trim().to_ascii_lowercase()),
        };

        let remote = RemoteSettings {
            ollama_endpoint: get("OLLAMA_HOST")
                .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
            ollama_model: get("SYMPTOM_DX_OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("SYMPTOM_DX_OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        };

        let thresholds = Thresholds {
            symptom: parse_threshold(get("SYMPTOM_DX_SYMPTOM_THRESHOLD"), DEFAULT_SYMPTOM_THRESHOLD)?,
            diagnosis: parse_threshold(
                get("SYMPTOM_DX_DIAGNOSIS_THRESHOLD"),
                DEFAULT_DIAGNOSIS_THRESHOLD,
            )?,
        };
        thresholds.validate()?;

        Ok(Config {
            symptom_catalog,
            illness_catalog,
            embedder,
            model,
            remote,
            thresholds,
        })
    }
}

/// Expand a leading `~` in user-supplied paths
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

fn default_model_path(data_dir: &Path) -> PathBuf {
    dirs::cache_dir()
        .map(|cache| cache.join("symptom-dx").join(MODEL_FILE))
        .unwrap_or_else(|| data_dir.join(MODEL_FILE))
}

fn parse_threshold(raw: Option<String>, default: f32) -> Result<f32> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<f32>()
            .map_err(|_| DxError::Config(format!("Invalid threshold: {}", value))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.symptom_catalog,
            PathBuf::from(DEFAULT_DATA_DIR).join(SYMPTOM_CATALOG_FILE)
        );
        assert_eq!(
            config.illness_catalog,
            PathBuf::from(DEFAULT_DATA_DIR).join(ILLNESS_CATALOG_FILE)
        );
        assert_eq!(config.embedder, EmbedderKind::Vectors);
        assert_eq!(config.thresholds, Thresholds::default());
        assert!(config.model.url.is_none());
        assert!(config.model.path.ends_with(MODEL_FILE));
    }

    #[test]
    fn test_data_dir_moves_both_catalogs() {
        let config = config_from(&[("SYMPTOM_DX_DATA_DIR", "/srv/dx")]).unwrap();
        assert_eq!(config.symptom_catalog, PathBuf::from("/srv/dx/symptoms.json"));
        assert_eq!(
            config.illness_catalog,
            PathBuf::from("/srv/dx/diagnosis_data.json")
        );
    }

    #[test]
    fn test_threshold_overrides() {
        let config = config_from(&[
            ("SYMPTOM_DX_SYMPTOM_THRESHOLD", "0.9"),
            ("SYMPTOM_DX_DIAGNOSIS_THRESHOLD", " 0.25 "),
        ])
        .unwrap();
        assert_eq!(config.thresholds.symptom, 0.9);
        assert_eq!(config.thresholds.diagnosis, 0.25);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = config_from(&[("SYMPTOM_DX_SYMPTOM_THRESHOLD", "1.5")]).unwrap_err();
        assert!(matches!(err, DxError::Config(_)));
        let err = config_from(&[("SYMPTOM_DX_DIAGNOSIS_THRESHOLD", "abc")]).unwrap_err();
        assert!(matches!(err, DxError::Config(_)));
    }

    #[test]
    fn test_embedder_kind_parsing() {
        assert_eq!("Ollama".parse::<EmbedderKind>().unwrap(), EmbedderKind::Ollama);
        assert_eq!("openai".parse::<EmbedderKind>().unwrap(), EmbedderKind::OpenAi);
        assert_eq!("vectors".parse::<EmbedderKind>().unwrap(), EmbedderKind::Vectors);
        assert!("spacy".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_checksum_is_normalised() {
        let config = config_from(&[("SYMPTOM_DX_MODEL_SHA256", " ABCDEF ")]).unwrap();
        assert_eq!(config.model.sha256.as_deref(), Some("abcdef"));
    }
}
