use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{expand_path, Config};
use crate::error::Result;

#[derive(Parser)]
#[command(
    name = "symptom-dx",
    about = "Symptom-to-diagnosis lookup for conversational agents",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(global = true, long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Symptom catalog JSON (overrides SYMPTOM_DX_SYMPTOMS)
    #[arg(global = true, long = "symptoms")]
    pub symptom_catalog: Option<PathBuf>,

    /// Illness catalog JSON (overrides SYMPTOM_DX_ILLNESSES)
    #[arg(global = true, long = "illnesses")]
    pub illness_catalog: Option<PathBuf>,

    /// Word-vector model file (overrides SYMPTOM_DX_MODEL)
    #[arg(global = true, long)]
    pub model: Option<PathBuf>,

    /// Embedding backend: vectors, ollama, openai (overrides SYMPTOM_DX_EMBEDDER)
    #[arg(global = true, long)]
    pub embedder: Option<String>,

    /// Similarity a catalog symptom must exceed to be flagged
    #[arg(global = true, long)]
    pub symptom_threshold: Option<f32>,

    /// Similarity an illness must exceed for a confident diagnosis
    #[arg(global = true, long)]
    pub diagnosis_threshold: Option<f32>,

    /// Fetch the model from SYMPTOM_DX_MODEL_URL if it is missing
    #[arg(global = true, long)]
    pub fetch: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnose one or more symptom descriptions
    Diagnose {
        /// Symptom descriptions (e.g. "high fever" "dry cough")
        #[arg(required = true)]
        symptoms: Vec<String>,

        /// Show flagged catalog symptoms and illness scores
        #[arg(long)]
        explain: bool,
    },

    /// Run the diagnose action on a dialogue-engine message (JSON)
    Handle {
        /// Read the request from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Load the model and catalogs and report what was found
    Check,

    /// Download the word-vector model from SYMPTOM_DX_MODEL_URL
    FetchModel {
        /// Re-download even if the model file exists
        #[arg(long)]
        force: bool,
    },

    /// Encode canonical symptom names into a symptom catalog
    BuildCatalog {
        /// Text file with one symptom name per line
        #[arg(long)]
        names: PathBuf,

        /// Where to write the catalog JSON
        #[arg(long)]
        out: PathBuf,
    },
}

impl Cli {
    /// Layer command-line overrides on top of the environment config
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(path) = &self.symptom_catalog {
            config.symptom_catalog = expand_path(&path.to_string_lossy());
        }
        if let Some(path) = &self.illness_catalog {
            config.illness_catalog = expand_path(&path.to_string_lossy());
        }
        if let Some(path) = &self.model {
            config.model.path = expand_path(&path.to_string_lossy());
        }
        if let Some(kind) = &self.embedder {
            config.embedder = kind.parse()?;
        }
        if let Some(threshold) = self.symptom_threshold {
            config.thresholds.symptom = threshold;
        }
        if let Some(threshold) = self.diagnosis_threshold {
            config.thresholds.diagnosis = threshold;
        }
        config.thresholds.validate()
    }
}
