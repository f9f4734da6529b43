use std::path::Path;

use colored::Colorize;

use crate::catalog::SymptomCatalog;
use crate::config::Config;
use crate::diagnosis::Encoder;
use crate::embeddings;
use crate::error::{DxError, Result};

/// Encode canonical symptom names (one per line, `#` comments allowed) into a catalog
pub fn cmd_build_catalog(
    config: &Config,
    names_path: &Path,
    out: &Path,
    allow_fetch: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(names_path)?;
    let names: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(DxError::InvalidInput(format!(
            "{} lists no symptom names",
            names_path.display()
        )));
    }

    let embedder = embeddings::load_embedder(config, allow_fetch)?;
    let encoder = Encoder::new(embedder.as_ref());
    let catalog = SymptomCatalog::from_names(&encoder, &names)?;
    catalog.save(out)?;

    println!(
        "{} Wrote {} symptoms ({} dimensions) to {}",
        "Done!".green().bold(),
        catalog.len(),
        catalog.dimension(),
        out.display()
    );
    Ok(())
}
