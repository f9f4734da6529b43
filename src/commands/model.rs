use colored::Colorize;

use crate::config::{Config, EmbedderKind};
use crate::embeddings::bootstrap::{self, FetchOutcome};
use crate::error::{DxError, Result};

pub fn cmd_fetch_model(config: &Config, force: bool) -> Result<()> {
    if config.embedder != EmbedderKind::Vectors {
        return Err(DxError::Config(
            "fetch-model only applies to the local word-vector embedder".into(),
        ));
    }

    match bootstrap::ensure_model(&config.model, force)? {
        FetchOutcome::AlreadyPresent => println!(
            "{} Model already present at {}",
            "ok".green().bold(),
            config.model.path.display()
        ),
        FetchOutcome::Fetched { bytes } => println!(
            "{} Fetched {} to {}",
            "Done!".green().bold(),
            humansize::format_size(bytes, humansize::BINARY),
            config.model.path.display()
        ),
    }
    Ok(())
}
