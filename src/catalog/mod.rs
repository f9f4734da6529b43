//! Reference tables: the symptom catalog and the illness catalog.
//!
//! The symptom catalog's row order is the schema of the indicator space:
//! flag `i` of an indicator vector and component `i` of every illness
//! vector both refer to symptom row `i`. Both tables are validated against
//! that schema when they are built, so width mismatches never reach scoring.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnosis::Encoder;
use crate::error::{DxError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomCatalogEntry {
    #[serde(alias = "name", alias = "symptom_name")]
    pub symptom: String,
    #[serde(alias = "symptom_vector")]
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    entries: Vec<SymptomCatalogEntry>,
    dims: usize,
}

impl SymptomCatalog {
    pub fn new(entries: Vec<SymptomCatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(DxError::CatalogLoad("symptom catalog is empty".into()));
        }

        check_names(entries.iter().map(|e| e.symptom.as_str()), "symptom")?;

        let dims = entries[0].vector.len();
        if dims == 0 {
            return Err(DxError::CatalogLoad(format!(
                "symptom '{}' has an empty vector",
                entries[0].symptom
            )));
        }

        for entry in &entries {
            if entry.vector.len() != dims {
                return Err(DxError::CatalogLoad(format!(
                    "symptom '{}' has {} components, expected {}",
                    entry.symptom,
                    entry.vector.len(),
                    dims
                )));
            }
            if entry.vector.iter().any(|x| !x.is_finite()) {
                return Err(DxError::CatalogLoad(format!(
                    "symptom '{}' has a non-finite component",
                    entry.symptom
                )));
            }
            if entry.vector.iter().all(|x| *x == 0.0) {
                tracing::warn!(symptom = %entry.symptom, "symptom vector is all zeros and can never match");
            }
        }

        Ok(Self { entries, dims })
    }

    /// Load from a JSON array of `{"symptom", "vector"}` rows
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_catalog(path)?;
        let entries: Vec<SymptomCatalogEntry> = serde_json::from_str(&content)
            .map_err(|e| DxError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::new(entries)?;

        tracing::info!(
            path = %path.display(),
            symptoms = catalog.len(),
            dims = catalog.dims,
            "loaded symptom catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog by encoding each canonical symptom name
    pub fn from_names(encoder: &Encoder<'_>, names: &[String]) -> Result<Self> {
        let entries = names
            .iter()
            .map(|name| {
                let symptom = name.trim().to_string();
                let vector = encoder.encode(&symptom)?;
                Ok(SymptomCatalogEntry { symptom, vector })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of rows (K, the indicator width)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension (D)
    pub fn dimension(&self) -> usize {
        self.dims
    }

    pub fn entries(&self) -> &[SymptomCatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symptom.as_str())
    }

    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.entries.iter().map(|e| e.vector.as_slice())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.entries
            .iter()
            .position(|e| e.symptom.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IllnessCatalogEntry {
    pub illness: String,
    pub vector: Vec<f32>,
}

/// How an illness row describes itself in indicator space
#[derive(Debug, Clone, PartialEq)]
pub enum IllnessSignature {
    /// Raw vector, one component per symptom row
    Vector(Vec<f32>),
    /// Names of symptom rows that are present
    Symptoms(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct IllnessRecord {
    #[serde(alias = "name", alias = "illness_name")]
    illness: String,
    #[serde(default, alias = "illness_vector")]
    vector: Option<Vec<f32>>,
    #[serde(default)]
    symptoms: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IllnessFile {
    Table {
        #[serde(default)]
        schema: Option<Vec<String>>,
        illnesses: Vec<IllnessRecord>,
    },
    Rows(Vec<IllnessRecord>),
}

#[derive(Debug, Clone)]
pub struct IllnessCatalog {
    entries: Vec<IllnessCatalogEntry>,
}

impl IllnessCatalog {
    /// Resolve every signature against the symptom catalog's row order
    pub fn new(schema: &SymptomCatalog, rows: Vec<(String, IllnessSignature)>) -> Result<Self> {
        if rows.is_empty() {
            return Err(DxError::CatalogLoad("illness catalog is empty".into()));
        }

        // Repeated illness names are separate signatures; ranking picks the better one
        if rows.iter().any(|(name, _)| name.trim().is_empty()) {
            return Err(DxError::CatalogLoad("illness catalog has a blank name".into()));
        }

        let width = schema.len();
        let entries = rows
            .into_iter()
            .map(|(illness, signature)| {
                let vector = match signature {
                    IllnessSignature::Vector(vector) => {
                        if vector.len() != width {
                            return Err(DxError::CatalogLoad(format!(
                                "illness '{}' has {} components but the symptom catalog has {} rows",
                                illness,
                                vector.len(),
                                width
                            )));
                        }
                        if vector.iter().any(|x| !x.is_finite()) {
                            return Err(DxError::CatalogLoad(format!(
                                "illness '{}' has a non-finite component",
                                illness
                            )));
                        }
                        vector
                    }
                    IllnessSignature::Symptoms(names) => {
                        let mut vector = vec![0.0; width];
                        for name in &names {
                            let idx = schema.position(name).ok_or_else(|| {
                                DxError::CatalogLoad(format!(
                                    "illness '{}' lists unknown symptom '{}'",
                                    illness, name
                                ))
                            })?;
                            vector[idx] = 1.0;
                        }
                        vector
                    }
                };
                Ok(IllnessCatalogEntry { illness, vector })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Load from JSON, either `{"schema": [...], "illnesses": [...]}` or a bare row array.
    ///
    /// A declared schema must list the symptom catalog's names in row order.
    pub fn load(path: &Path, schema: &SymptomCatalog) -> Result<Self> {
        let content = read_catalog(path)?;
        let file: IllnessFile = serde_json::from_str(&content)
            .map_err(|e| DxError::CatalogLoad(format!("{}: {}", path.display(), e)))?;

        let (declared, records) = match file {
            IllnessFile::Table { schema, illnesses } => (schema, illnesses),
            IllnessFile::Rows(rows) => (None, rows),
        };

        if let Some(declared) = declared {
            check_schema(&declared, schema)?;
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let signature = match (record.vector, record.symptoms) {
                    (Some(vector), None) => IllnessSignature::Vector(vector),
                    (None, Some(symptoms)) => IllnessSignature::Symptoms(symptoms),
                    (Some(_), Some(_)) => {
                        return Err(DxError::CatalogLoad(format!(
                            "illness '{}' sets both 'vector' and 'symptoms'",
                            record.illness
                        )))
                    }
                    (None, None) => {
                        return Err(DxError::CatalogLoad(format!(
                            "illness '{}' needs a 'vector' or a 'symptoms' list",
                            record.illness
                        )))
                    }
                };
                Ok((record.illness, signature))
            })
            .collect::<Result<Vec<_>>>()?;

        let catalog = Self::new(schema, rows)?;
        tracing::info!(
            path = %path.display(),
            illnesses = catalog.len(),
            width = catalog.width(),
            "loaded illness catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of every illness vector
    pub fn width(&self) -> usize {
        self.entries.first().map(|e| e.vector.len()).unwrap_or(0)
    }

    pub fn entries(&self) -> &[IllnessCatalogEntry] {
        &self.entries
    }

    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.entries.iter().map(|e| e.vector.as_slice())
    }
}

/// Both reference tables, validated against each other
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub symptoms: SymptomCatalog,
    pub illnesses: IllnessCatalog,
}

impl Catalogs {
    pub fn load(symptom_path: &Path, illness_path: &Path) -> Result<Self> {
        let symptoms = SymptomCatalog::load(symptom_path)?;
        let illnesses = IllnessCatalog::load(illness_path, &symptoms)?;
        Ok(Self {
            symptoms,
            illnesses,
        })
    }
}

fn read_catalog(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DxError::CatalogLoad(format!("cannot read {}: {}", path.display(), e)))
}

fn check_names<'a>(names: impl Iterator<Item = &'a str>, kind: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(DxError::CatalogLoad(format!("{} catalog has a blank name", kind)));
        }
        if !seen.insert(key) {
            return Err(DxError::CatalogLoad(format!(
                "{} '{}' appears more than once",
                kind, name
            )));
        }
    }
    Ok(())
}

fn check_schema(declared: &[String], symptoms: &SymptomCatalog) -> Result<()> {
    if declared.len() != symptoms.len() {
        return Err(DxError::CatalogLoad(format!(
            "illness schema lists {} symptoms but the symptom catalog has {}",
            declared.len(),
            symptoms.len()
        )));
    }
    for (idx, (want, have)) in declared.iter().zip(symptoms.names()).enumerate() {
        if !want.trim().eq_ignore_ascii_case(have.trim()) {
            return Err(DxError::CatalogLoad(format!(
                "illness schema position {} is '{}' but symptom row {} is '{}'",
                idx, want, idx, have
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, vector: &[f32]) -> SymptomCatalogEntry {
        SymptomCatalogEntry {
            symptom: name.to_string(),
            vector: vector.to_vec(),
        }
    }

    fn symptoms() -> SymptomCatalog {
        SymptomCatalog::new(vec![
            entry("fever", &[1.0, 0.0]),
            entry("cough", &[0.0, 1.0]),
            entry("headache", &[1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_symptom_catalog_shape() {
        let catalog = symptoms();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.dimension(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["fever", "cough", "headache"]);
        assert_eq!(catalog.position("Cough"), Some(1));
    }

    #[test]
    fn test_symptom_catalog_rejects_ragged_vectors() {
        let err = SymptomCatalog::new(vec![entry("fever", &[1.0, 0.0]), entry("cough", &[1.0])])
            .unwrap_err();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_symptom_catalog_rejects_duplicates_and_blanks() {
        assert!(SymptomCatalog::new(vec![entry("fever", &[1.0]), entry("Fever", &[0.5])]).is_err());
        assert!(SymptomCatalog::new(vec![entry("  ", &[1.0])]).is_err());
        assert!(SymptomCatalog::new(vec![]).is_err());
    }

    #[test]
    fn test_illness_width_must_match_symptom_rows() {
        let err = IllnessCatalog::new(
            &symptoms(),
            vec![("flu".into(), IllnessSignature::Vector(vec![1.0, 1.0]))],
        )
        .unwrap_err();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_illness_symptom_list_resolves_in_row_order() {
        let catalog = IllnessCatalog::new(
            &symptoms(),
            vec![(
                "flu".into(),
                IllnessSignature::Symptoms(vec!["headache".into(), "fever".into()]),
            )],
        )
        .unwrap();
        assert_eq!(catalog.entries()[0].vector, vec![1.0, 0.0, 1.0]);
        assert_eq!(catalog.width(), 3);
    }

    #[test]
    fn test_illness_names_may_repeat_but_not_be_blank() {
        let catalog = IllnessCatalog::new(
            &symptoms(),
            vec![
                ("flu".into(), IllnessSignature::Symptoms(vec!["fever".into(), "cough".into()])),
                ("flu".into(), IllnessSignature::Symptoms(vec!["fever".into()])),
            ],
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);

        let err = IllnessCatalog::new(
            &symptoms(),
            vec![(" ".into(), IllnessSignature::Symptoms(vec!["fever".into()]))],
        )
        .unwrap_err();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_illness_unknown_symptom_name() {
        let err = IllnessCatalog::new(
            &symptoms(),
            vec![("flu".into(), IllnessSignature::Symptoms(vec!["rash".into()]))],
        )
        .unwrap_err();
        assert!(err.to_string().contains("rash"));
    }

    #[test]
    fn test_load_table_with_schema() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diagnosis_data.json");
        std::fs::write(
            &path,
            r#"{
                "schema": ["fever", "cough", "headache"],
                "illnesses": [
                    {"illness": "flu", "vector": [1, 1, 1]},
                    {"illness": "migraine", "symptoms": ["headache"]}
                ]
            }"#,
        )
        .unwrap();

        let catalog = IllnessCatalog::load(&path, &symptoms()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].vector, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_load_rejects_reordered_schema() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diagnosis_data.json");
        std::fs::write(
            &path,
            r#"{"schema": ["cough", "fever", "headache"], "illnesses": [{"illness": "flu", "vector": [1, 1, 1]}]}"#,
        )
        .unwrap();

        let err = IllnessCatalog::load(&path, &symptoms()).unwrap_err();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_load_bare_rows_with_long_column_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diagnosis_data.json");
        std::fs::write(&path, r#"[{"illness": "flu", "illness_vector": [1, 0, 0]}]"#).unwrap();

        let catalog = IllnessCatalog::load(&path, &symptoms()).unwrap();
        assert_eq!(catalog.entries()[0].illness, "flu");
    }

    #[test]
    fn test_load_rejects_both_signature_forms() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diagnosis_data.json");
        std::fs::write(
            &path,
            r#"[{"illness": "flu", "vector": [1, 0, 0], "symptoms": ["fever"]}]"#,
        )
        .unwrap();

        assert!(IllnessCatalog::load(&path, &symptoms()).is_err());
    }

    #[test]
    fn test_missing_file_is_catalog_error() {
        let err = SymptomCatalog::load(Path::new("/no/such/symptoms.json")).unwrap_err();
        assert!(matches!(err, DxError::CatalogLoad(_)));
    }

    #[test]
    fn test_save_then_load_symptoms() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("symptoms.json");
        symptoms().save(&path).unwrap();

        let loaded = SymptomCatalog::load(&path).unwrap();
        assert_eq!(loaded.entries(), symptoms().entries());
    }
}
