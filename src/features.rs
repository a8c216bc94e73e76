//! Canonical feature layout for the diabetes classifiers.
//!
//! The models were trained on a fixed column order; every row handed to a
//! classifier is laid out exactly as [`FEATURE_NAMES`].

/// Number of model input features.
pub const FEATURE_COUNT: usize = 8;

/// Ground-truth column dropped from uploaded tables before validation.
pub const LABEL_COLUMN: &str = "Outcome";

/// Feature names in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

/// One model input row in canonical order.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Accepted range and form default for one single-record input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Integer-valued field (counts, mg/dL, years)
    pub integer: bool,
}

impl FieldBounds {
    /// Whether `value` lies inside the inclusive range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Input bounds for the single-patient form, in canonical order.
pub const FIELD_BOUNDS: [FieldBounds; FEATURE_COUNT] = [
    FieldBounds { name: "Pregnancies", min: 0.0, max: 20.0, default: 1.0, integer: true },
    FieldBounds { name: "Glucose", min: 0.0, max: 200.0, default: 100.0, integer: true },
    FieldBounds { name: "BloodPressure", min: 0.0, max: 150.0, default: 70.0, integer: true },
    FieldBounds { name: "SkinThickness", min: 0.0, max: 100.0, default: 20.0, integer: true },
    FieldBounds { name: "Insulin", min: 0.0, max: 900.0, default: 85.0, integer: true },
    FieldBounds { name: "BMI", min: 0.0, max: 70.0, default: 25.0, integer: false },
    FieldBounds {
        name: "DiabetesPedigreeFunction",
        min: 0.0,
        max: 3.0,
        default: 0.5,
        integer: false,
    },
    FieldBounds { name: "Age", min: 1.0, max: 120.0, default: 30.0, integer: true },
];

/// Look up the bounds of a feature by column name.
pub fn bounds_for(name: &str) -> Option<&'static FieldBounds> {
    FIELD_BOUNDS.iter().find(|b| b.name == name)
}

/// Position of a feature in the canonical layout.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&n| n == name)
}
