//! Schema validation for uploaded patient tables.
//!
//! An uploaded table may carry any columns in any order. Validation drops the
//! ground-truth label, checks that every model feature is present and projects
//! the table onto [`FEATURE_NAMES`] so the classifiers always see the column
//! order they were trained on.

use crate::error::SchemaError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, LABEL_COLUMN};
use crate::types::TablePreview;

/// A table as read from the upload: header row plus raw text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Copy of the table without the label column, if present.
    ///
    /// The match is exact and case-sensitive: `outcome` or `OUTCOME` stay in
    /// the table as ordinary extra columns.
    pub fn without_label(&self) -> RawTable {
        match self.column_index(LABEL_COLUMN) {
            Some(idx) => RawTable {
                headers: remove_at(&self.headers, idx),
                rows: self.rows.iter().map(|row| remove_at(row, idx)).collect(),
            },
            None => self.clone(),
        }
    }

    /// First `n` rows, all columns.
    pub fn preview(&self, n: usize) -> TablePreview {
        TablePreview {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

fn remove_at(cells: &[String], idx: usize) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .map(|(_, cell)| cell.clone())
        .collect()
}

/// Validated model input: exactly the feature columns, in canonical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    /// Wrap rows that are already in canonical order.
    pub fn from_rows(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    /// Column names, always [`FEATURE_NAMES`].
    pub fn columns(&self) -> &'static [&'static str; FEATURE_COUNT] {
        &FEATURE_NAMES
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render back into a raw table with canonical headers.
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            headers: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }
}

/// Required feature columns absent from `headers`, in canonical order.
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    FEATURE_NAMES
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|s| s.to_string())
        .collect()
}

/// Validate an uploaded table and project it onto the model features.
///
/// Fails with [`SchemaError::MissingColumns`] listing exactly the absent
/// features, or [`SchemaError::InvalidValue`] when a feature cell is not a
/// number. Extra columns are dropped without inspection.
pub fn validate(table: &RawTable) -> Result<FeatureTable, SchemaError> {
    let table = table.without_label();

    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    let mut positions = [0usize; FEATURE_COUNT];
    for (slot, name) in positions.iter_mut().zip(FEATURE_NAMES) {
        // presence checked above
        *slot = table.column_index(name).unwrap_or_default();
    }

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, cells)| {
            let mut row = [0.0; FEATURE_COUNT];
            for (i, &pos) in positions.iter().enumerate() {
                let raw = cells.get(pos).map(String::as_str).unwrap_or("");
                row[i] = parse_cell(raw).ok_or_else(|| SchemaError::InvalidValue {
                    row: row_idx + 1,
                    column: FEATURE_NAMES[i].to_string(),
                    value: raw.to_string(),
                })?;
            }
            Ok(row)
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(FeatureTable { rows })
}

fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    const PIMA_HEADERS: [&str; 9] = [
        "Pregnancies",
        "Glucose",
        "BloodPressure",
        "SkinThickness",
        "Insulin",
        "BMI",
        "DiabetesPedigreeFunction",
        "Age",
        "Outcome",
    ];

    #[test]
    fn test_missing_columns_listed_exactly() {
        let t = table(
            &["Age", "Pregnancies", "BMI", "Insulin", "SkinThickness"],
            &[&["50", "6", "33.6", "0", "35"]],
        );
        let err = validate(&t).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns(vec![
                "Glucose".to_string(),
                "BloodPressure".to_string(),
                "DiabetesPedigreeFunction".to_string(),
            ])
        );
    }

    #[test]
    fn test_projection_to_canonical_order() {
        let t = table(
            &[
                "Outcome",
                "Age",
                "PatientId",
                "DiabetesPedigreeFunction",
                "BMI",
                "Insulin",
                "SkinThickness",
                "BloodPressure",
                "Glucose",
                "Pregnancies",
            ],
            &[
                &["1", "50", "p-1", "0.627", "33.6", "0", "35", "72", "148", "6"],
                &["0", "31", "p-2", "0.351", "26.6", "0", "29", "66", "85", "1"],
            ],
        );
        let features = validate(&t).unwrap();
        assert_eq!(features.columns(), &FEATURE_NAMES);
        assert_eq!(features.len(), 2);
        assert_eq!(
            features.rows()[0],
            [6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0]
        );
        assert_eq!(features.rows()[1][7], 31.0);
    }

    #[test]
    fn test_outcome_drop_is_case_sensitive() {
        let mut headers = PIMA_HEADERS.to_vec();
        headers[8] = "outcome";
        let t = table(&headers, &[&["6", "148", "72", "35", "0", "33.6", "0.627", "50", "1"]]);

        let stripped = t.without_label();
        assert_eq!(stripped.headers.len(), 9);
        assert!(stripped.column_index("outcome").is_some());

        // still valid: an unknown extra column is projected away
        assert_eq!(validate(&t).unwrap().len(), 1);
    }

    #[test]
    fn test_outcome_dropped_when_present() {
        let t = table(&PIMA_HEADERS, &[&["6", "148", "72", "35", "0", "33.6", "0.627", "50", "1"]]);
        let stripped = t.without_label();
        assert_eq!(stripped.headers.len(), 8);
        assert_eq!(stripped.rows[0].len(), 8);
        assert!(stripped.column_index(LABEL_COLUMN).is_none());
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let t = table(&PIMA_HEADERS, &[&["1", "89", "66", "23", "94", "28.1", "0.167", "21", "0"]]);
        let first = validate(&t).unwrap();
        let raw = first.to_raw();
        assert!(missing_columns(&raw.headers).is_empty());
        assert_eq!(validate(&raw).unwrap(), first);
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let t = table(&PIMA_HEADERS, &[
            &["1", "89", "66", "23", "94", "28.1", "0.167", "21", "0"],
            &["2", "n/a", "66", "23", "94", "28.1", "0.167", "21", "0"],
        ]);
        let err = validate(&t).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidValue {
                row: 2,
                column: "Glucose".to_string(),
                value: "n/a".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_table_validates() {
        let t = table(&PIMA_HEADERS, &[]);
        assert!(validate(&t).unwrap().is_empty());
    }

    #[test]
    fn test_preview_keeps_all_columns() {
        let t = table(&PIMA_HEADERS, &[
            &["1", "89", "66", "23", "94", "28.1", "0.167", "21", "0"],
            &["5", "116", "74", "0", "0", "25.6", "0.201", "30", "0"],
        ]);
        let preview = t.preview(1);
        assert_eq!(preview.headers.len(), 9);
        assert_eq!(preview.rows.len(), 1);
    }
}
