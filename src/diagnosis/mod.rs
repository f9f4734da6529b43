pub mod diagnoser;
pub mod encoder;
pub mod indicator;

pub use diagnoser::{Diagnoser, Diagnosis, IllnessScore};
pub use encoder::Encoder;
pub use indicator::{IndicatorBuilder, IndicatorVector, SymptomMatch};

/// Returned when no catalog symptom was detected
pub const NO_SYMPTOMS_MESSAGE: &str = "I couldn't identify any symptoms to make a diagnosis.";

/// Returned when scoring against the illness catalog fails
pub const DIAGNOSIS_ERROR_MESSAGE: &str =
    "I encountered an error while trying to process your symptoms. Please try again later.";
