//! Single patient record entered through the form

use crate::features::{FeatureVector, FIELD_BOUNDS};
use serde::{Deserialize, Serialize};

/// Represents one patient to be scored for diabetes risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Number of pregnancies
    #[serde(alias = "Pregnancies")]
    pub pregnancies: u32,

    /// Plasma glucose concentration (mg/dL)
    #[serde(alias = "Glucose")]
    pub glucose: u32,

    /// Diastolic blood pressure (mm Hg)
    #[serde(alias = "BloodPressure")]
    pub blood_pressure: u32,

    /// Triceps skin fold thickness (mm)
    #[serde(alias = "SkinThickness")]
    pub skin_thickness: u32,

    /// 2-hour serum insulin (mu U/ml)
    #[serde(alias = "Insulin")]
    pub insulin: u32,

    /// Body mass index
    #[serde(alias = "BMI")]
    pub bmi: f64,

    /// Diabetes pedigree function
    #[serde(alias = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree_function: f64,

    /// Age in years
    #[serde(alias = "Age")]
    pub age: u32,
}

impl PatientRecord {
    /// Model input row in canonical feature order.
    pub fn to_features(&self) -> FeatureVector {
        [
            self.pregnancies as f64,
            self.glucose as f64,
            self.blood_pressure as f64,
            self.skin_thickness as f64,
            self.insulin as f64,
            self.bmi,
            self.diabetes_pedigree_function,
            self.age as f64,
        ]
    }
}

impl Default for PatientRecord {
    /// Form defaults.
    fn default() -> Self {
        let d = |i: usize| FIELD_BOUNDS[i].default;
        Self {
            pregnancies: d(0) as u32,
            glucose: d(1) as u32,
            blood_pressure: d(2) as u32,
            skin_thickness: d(3) as u32,
            insulin: d(4) as u32,
            bmi: d(5),
            diabetes_pedigree_function: d(6),
            age: d(7) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_form() {
        let record = PatientRecord::default();
        assert_eq!(record.pregnancies, 1);
        assert_eq!(record.glucose, 100);
        assert_eq!(record.bmi, 25.0);
        assert_eq!(record.age, 30);
    }

    #[test]
    fn test_features_in_canonical_order() {
        let record = PatientRecord {
            pregnancies: 6,
            glucose: 148,
            blood_pressure: 72,
            skin_thickness: 35,
            insulin: 0,
            bmi: 33.6,
            diabetes_pedigree_function: 0.627,
            age: 50,
        };
        assert_eq!(
            record.to_features(),
            [6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0]
        );
    }

    #[test]
    fn test_deserialize_from_column_names() {
        let json = r#"{"Pregnancies":2,"Glucose":120,"BloodPressure":70,"SkinThickness":20,
            "Insulin":80,"BMI":30.5,"DiabetesPedigreeFunction":0.4,"Age":41}"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.glucose, 120);
        assert_eq!(record.age, 41);
    }
}
