//! One-shot model bootstrap: fetch the word-vector bundle when it is missing.
//!
//! Only the CLI and `load_embedder(.., allow_fetch = true)` call into this;
//! encoding never triggers a download.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};

use crate::config::ModelSource;
use crate::error::{DxError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    Fetched { bytes: u64 },
}

/// Make sure the model file exists, downloading it once if allowed.
///
/// `force` re-downloads even when the file is present.
pub fn ensure_model(source: &ModelSource, force: bool) -> Result<FetchOutcome> {
    if source.path.exists() && !force {
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let url = source.url.as_deref().ok_or_else(|| {
        DxError::ModelUnavailable(format!(
            "no model at {} and SYMPTOM_DX_MODEL_URL is not set",
            source.path.display()
        ))
    })?;

    tracing::warn!(path = %source.path.display(), url, "model missing, attempting one-time fetch");

    let bytes = fetch(url).map_err(|e| {
        tracing::error!(url, error = %e, "model fetch failed");
        DxError::ModelUnavailable(format!("fetch from {} failed: {}", url, e))
    })?;

    if let Some(expected) = source.sha256.as_deref() {
        verify_checksum(&bytes, expected)?;
    }

    write_atomically(&source.path, &bytes)?;

    tracing::info!(
        path = %source.path.display(),
        size = %humansize::format_size(bytes.len() as u64, humansize::BINARY),
        "model fetched"
    );

    Ok(FetchOutcome::Fetched {
        bytes: bytes.len() as u64,
    })
}

/// Compare the SHA-256 of `bytes` with a hex digest (case-insensitive)
pub fn verify_checksum(bytes: &[u8], expected: &str) -> Result<()> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(DxError::ModelUnavailable(format!(
            "checksum mismatch: expected {}, got {}",
            expected.trim(),
            actual
        )))
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    // Local mirrors
    if let Some(local) = url.strip_prefix("file://") {
        return Ok(std::fs::read(local)?);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DxError::Config(format!("tokio runtime: {}", e)))?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = rt.block_on(download(url));

    pb.finish_and_clear();
    result
}

async fn download(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(DxError::ModelUnavailable(format!(
            "server answered {}",
            response.status()
        )));
    }
    Ok(response.bytes().await?.to_vec())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let partial = path.with_extension("part");
    std::fs::write(&partial, bytes)?;
    std::fs::rename(&partial, path)?;
    Ok(())
}
