use crate::catalog::SymptomCatalog;
use crate::embeddings::similarities;
use crate::error::Result;

/// One flag per symptom-catalog row, in row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorVector(Vec<u8>);

impl IndicatorVector {
    pub fn zeros(width: usize) -> Self {
        Self(vec![0; width])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn flags(&self) -> &[u8] {
        &self.0
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|f| *f == 0)
    }

    pub fn flagged_count(&self) -> usize {
        self.0.iter().filter(|f| **f != 0).count()
    }

    pub fn flagged_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, f)| **f != 0)
            .map(|(i, _)| i)
    }

    pub fn set(&mut self, idx: usize) {
        if let Some(flag) = self.0.get_mut(idx) {
            *flag = 1;
        }
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|f| *f as f32).collect()
    }
}

/// Any non-zero entry counts as set
impl From<Vec<u8>> for IndicatorVector {
    fn from(flags: Vec<u8>) -> Self {
        Self(flags.into_iter().map(|f| u8::from(f != 0)).collect())
    }
}

/// A catalog symptom flagged by at least one input, with its best score
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatch {
    pub index: usize,
    pub symptom: String,
    pub score: f32,
}

pub struct IndicatorBuilder<'a> {
    catalog: &'a SymptomCatalog,
    threshold: f32,
}

impl<'a> IndicatorBuilder<'a> {
    pub fn new(catalog: &'a SymptomCatalog, threshold: f32) -> Self {
        Self { catalog, threshold }
    }

    pub fn build(&self, encoded_symptoms: &[Vec<f32>]) -> Result<IndicatorVector> {
        self.build_with_matches(encoded_symptoms)
            .map(|(indicator, _)| indicator)
    }

    /// Flag every catalog row whose similarity to any input is strictly above
    /// the threshold. Flags only ever accumulate; empty inputs are skipped.
    pub fn build_with_matches(
        &self,
        encoded_symptoms: &[Vec<f32>],
    ) -> Result<(IndicatorVector, Vec<SymptomMatch>)> {
        let mut indicator = IndicatorVector::zeros(self.catalog.len());
        let mut best: Vec<Option<f32>> = vec![None; self.catalog.len()];

        for encoded in encoded_symptoms {
            if encoded.is_empty() {
                continue;
            }

            let scores = similarities(encoded, self.catalog.vectors())?;
            let mut flagged = 0usize;
            for (idx, score) in scores.into_iter().enumerate() {
                if score > self.threshold {
                    indicator.set(idx);
                    best[idx] = Some(best[idx].map_or(score, |b| b.max(score)));
                    flagged += 1;
                }
            }
            tracing::debug!(flagged, "flagged potential symptom matches");
        }

        let matches = best
            .into_iter()
            .zip(self.catalog.entries())
            .enumerate()
            .filter_map(|(index, (score, entry))| {
                score.map(|score| SymptomMatch {
                    index,
                    symptom: entry.symptom.clone(),
                    score,
                })
            })
            .collect();

        Ok((indicator, matches))
    }
}
