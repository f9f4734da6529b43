use crate::catalog::Catalogs;
use crate::config::{Config, Thresholds};
use crate::diagnosis::{
    Diagnoser, Diagnosis, Encoder, IllnessScore, IndicatorBuilder, IndicatorVector, SymptomMatch,
};
use crate::embeddings::{self, Embedder};
use crate::error::{DxError, Result};

/// Everything a diagnosis needs: both catalogs, the embedding backend and thresholds.
///
/// Built once and shared read-only across turns.
pub struct DiagnosisContext {
    catalogs: Catalogs,
    embedder: Box<dyn Embedder>,
    thresholds: Thresholds,
}

/// Full trace of one multi-symptom diagnosis
#[derive(Debug, Clone)]
pub struct Assessment {
    pub indicator: IndicatorVector,
    pub matches: Vec<SymptomMatch>,
    pub ranking: Vec<IllnessScore>,
    pub diagnosis: Diagnosis,
}

impl DiagnosisContext {
    pub fn new(
        catalogs: Catalogs,
        embedder: Box<dyn Embedder>,
        thresholds: Thresholds,
    ) -> Result<Self> {
        thresholds.validate()?;

        if let Some(dims) = embedder.dimensions() {
            let expected = catalogs.symptoms.dimension();
            if dims != expected {
                return Err(DxError::CatalogLoad(format!(
                    "symptom vectors have {} dimensions but the {} model produces {}",
                    expected,
                    embedder.name(),
                    dims
                )));
            }
        }

        Ok(Self {
            catalogs,
            embedder,
            thresholds,
        })
    }

    /// Load the embedding backend and both catalogs named by `config`
    pub fn from_config(config: &Config, allow_fetch: bool) -> Result<Self> {
        let embedder = embeddings::load_embedder(config, allow_fetch)?;
        let catalogs = Catalogs::load(&config.symptom_catalog, &config.illness_catalog)?;
        Self::new(catalogs, embedder, config.thresholds)
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    pub fn encoder(&self) -> Encoder<'_> {
        Encoder::new(self.embedder.as_ref())
    }

    pub fn indicator_builder(&self) -> IndicatorBuilder<'_> {
        IndicatorBuilder::new(&self.catalogs.symptoms, self.thresholds.symptom)
    }

    pub fn diagnoser(&self) -> Diagnoser<'_> {
        Diagnoser::new(&self.catalogs.illnesses, self.thresholds.diagnosis)
    }

    /// Encode every symptom, build one indicator, and diagnose it
    pub fn assess<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Assessment> {
        let encoder = self.encoder();
        let encoded = symptoms
            .iter()
            .map(|s| encoder.encode(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let (indicator, matches) = self.indicator_builder().build_with_matches(&encoded)?;
        let (diagnosis, ranking) = self.diagnoser().assess_ranked(&indicator)?;

        Ok(Assessment {
            indicator,
            matches,
            ranking,
            diagnosis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{IllnessCatalog, IllnessSignature, SymptomCatalog, SymptomCatalogEntry};
    use crate::embeddings::WordVectors;

    fn catalogs() -> Catalogs {
        let symptoms = SymptomCatalog::new(vec![
            SymptomCatalogEntry {
                symptom: "fever".into(),
                vector: vec![1.0, 0.0],
            },
            SymptomCatalogEntry {
                symptom: "cough".into(),
                vector: vec![0.0, 1.0],
            },
        ])
        .unwrap();
        let illnesses = IllnessCatalog::new(
            &symptoms,
            vec![
                ("flu".into(), IllnessSignature::Symptoms(vec!["fever".into(), "cough".into()])),
                ("bronchitis".into(), IllnessSignature::Symptoms(vec!["cough".into()])),
            ],
        )
        .unwrap();
        Catalogs {
            symptoms,
            illnesses,
        }
    }

    fn model() -> Box<dyn Embedder> {
        Box::new(WordVectors::parse("fever 1 0\ntemperature 0.95 0.05\ncough 0 1\n").unwrap())
    }

    #[test]
    fn test_dimension_mismatch_fails_fast() {
        let wide = Box::new(WordVectors::parse("fever 1 0 0\n").unwrap());
        let err = DiagnosisContext::new(catalogs(), wide, Thresholds::default())
            .err()
            .unwrap();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let thresholds = Thresholds {
            symptom: f32::NAN,
            diagnosis: 0.5,
        };
        assert!(DiagnosisContext::new(catalogs(), model(), thresholds).is_err());
    }

    #[test]
    fn test_multi_symptom_assessment() {
        let ctx = DiagnosisContext::new(catalogs(), model(), Thresholds::default()).unwrap();
        let assessment = ctx.assess(&["temperature", "cough"]).unwrap();

        assert_eq!(assessment.indicator.flags(), &[1, 1]);
        assert_eq!(assessment.diagnosis.illness(), Some("flu"));
        assert_eq!(assessment.ranking[0].illness, "flu");
        assert_eq!(assessment.matches.len(), 2);
    }

    #[test]
    fn test_blank_symptom_propagates_invalid_input() {
        let ctx = DiagnosisContext::new(catalogs(), model(), Thresholds::default()).unwrap();
        assert!(matches!(ctx.assess(&[" "]), Err(DxError::InvalidInput(_))));
    }
}
