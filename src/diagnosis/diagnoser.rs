use std::fmt;

use super::{IndicatorVector, DIAGNOSIS_ERROR_MESSAGE, NO_SYMPTOMS_MESSAGE};
use crate::catalog::IllnessCatalog;
use crate::embeddings::similarities;
use crate::error::{DxError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// Indicator was empty or all zeros; the catalog was not consulted
    NoSymptoms,
    /// Best illness scored above the diagnosis threshold
    Confident { illness: String, score: f32 },
    /// Closest illness, but not above the threshold
    Hedged { illness: String, score: f32 },
}

impl Diagnosis {
    pub fn illness(&self) -> Option<&str> {
        match self {
            Diagnosis::NoSymptoms => None,
            Diagnosis::Confident { illness, .. } | Diagnosis::Hedged { illness, .. } => {
                Some(illness.as_str())
            }
        }
    }

    pub fn score(&self) -> Option<f32> {
        match self {
            Diagnosis::NoSymptoms => None,
            Diagnosis::Confident { score, .. } | Diagnosis::Hedged { score, .. } => Some(*score),
        }
    }

    /// User-facing sentence
    pub fn message(&self) -> String {
        match self {
            Diagnosis::NoSymptoms => NO_SYMPTOMS_MESSAGE.to_string(),
            Diagnosis::Confident { illness, .. } => {
                format!("Based on your symptoms it looks like you could have {}", illness)
            }
            Diagnosis::Hedged { illness, .. } => format!(
                "I'm not entirely sure, but I can suggest that you might have {}. \
                 However, please consult a doctor for a proper diagnosis.",
                illness
            ),
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IllnessScore {
    pub index: usize,
    pub illness: String,
    pub score: f32,
}

pub struct Diagnoser<'a> {
    catalog: &'a IllnessCatalog,
    threshold: f32,
}

impl<'a> Diagnoser<'a> {
    pub fn new(catalog: &'a IllnessCatalog, threshold: f32) -> Self {
        Self { catalog, threshold }
    }

    /// Every illness scored against `indicator`, best first.
    ///
    /// Equal scores keep catalog order (stable sort), so the earliest row wins ties.
    pub fn rank(&self, indicator: &IndicatorVector) -> Result<Vec<IllnessScore>> {
        if self.catalog.is_empty() {
            return Err(DxError::Computation("illness catalog is empty".into()));
        }

        let query = indicator.to_f32();
        let scores = similarities(&query, self.catalog.vectors())?;

        let mut ranked: Vec<IllnessScore> = scores
            .into_iter()
            .zip(self.catalog.entries())
            .enumerate()
            .map(|(index, (score, entry))| IllnessScore {
                index,
                illness: entry.illness.clone(),
                score,
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    /// Typed decision; errors are returned, not converted
    pub fn assess(&self, indicator: &IndicatorVector) -> Result<Diagnosis> {
        self.assess_ranked(indicator).map(|(diagnosis, _)| diagnosis)
    }

    /// Decision plus the full ranking it was taken from, scored once.
    ///
    /// The ranking is empty when the indicator has no flags.
    pub fn assess_ranked(
        &self,
        indicator: &IndicatorVector,
    ) -> Result<(Diagnosis, Vec<IllnessScore>)> {
        if indicator.is_empty() || indicator.is_all_zero() {
            return Ok((Diagnosis::NoSymptoms, Vec::new()));
        }

        let ranked = self.rank(indicator)?;
        let top = ranked
            .first()
            .ok_or_else(|| DxError::Computation("no illness scores produced".into()))?;

        let diagnosis = if top.score > self.threshold {
            tracing::info!(illness = %top.illness, score = top.score, "diagnosing user");
            Diagnosis::Confident {
                illness: top.illness.clone(),
                score: top.score,
            }
        } else {
            tracing::warn!(
                illness = %top.illness,
                score = top.score,
                threshold = self.threshold,
                "unable to find a confident diagnosis, returning closest match"
            );
            Diagnosis::Hedged {
                illness: top.illness.clone(),
                score: top.score,
            }
        };
        Ok((diagnosis, ranked))
    }

    /// Message for the user; scoring failures become a generic apology
    pub fn diagnose(&self, indicator: &IndicatorVector) -> String {
        match self.assess(indicator) {
            Ok(diagnosis) => diagnosis.message(),
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "diagnosis failed");
                DIAGNOSIS_ERROR_MESSAGE.to_string()
            }
        }
    }
}
