//! Terminal rendering of batch reports and single predictions

use crate::models::loader::{ArtifactStatus, ModelRegistry};
use crate::types::{
    BatchReport, ModelName, RankingEntry, ShapSummary, SinglePrediction, TablePreview,
};
use std::io::{self, Write};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Left-aligned text table with a header separator.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn ranking_line(label: &str, entry: &RankingEntry) -> String {
    format!("{label:<14} {} (Avg Risk: {})", entry.model, entry.mean_score)
}

/// Render a batch report the way the dashboard shows it.
pub fn render_batch<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    render_preview(out, &report.preview)?;
    render_results(out, report)
}

/// Head of the uploaded table, shown before validation.
pub fn render_preview<W: Write>(out: &mut W, preview: &TablePreview) -> io::Result<()> {
    writeln!(out, "Uploaded Data Preview")?;
    writeln!(out, "{RULE}")?;
    write!(out, "{}", format_table(&preview.headers, &preview.rows))?;
    writeln!(out)
}

/// Everything after the preview: warnings, ranking, scores and SHAP status.
pub fn render_results<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    for skipped in &report.skipped {
        writeln!(out, "Warning: {}", skipped.warning())?;
    }
    if !report.skipped.is_empty() {
        writeln!(out)?;
    }

    writeln!(out, "Model Ranking (Based on Avg Risk)")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "{}", ranking_line("Best Model:", &report.best))?;
    if let Some(middle) = &report.middle {
        writeln!(out, "{}", ranking_line("Average Model:", middle))?;
    }
    writeln!(out, "{}", ranking_line("Worst Model:", &report.worst))?;
    writeln!(out)?;

    writeln!(out, "Risk Scores by Model ({} rows)", report.row_count)?;
    writeln!(out, "{RULE}")?;
    let models: Vec<&ModelName> = report.scores.keys().collect();
    let mut headers = vec![String::from("#")];
    headers.extend(models.iter().map(|m| m.to_string()));
    let rows: Vec<Vec<String>> = (0..report.row_count)
        .map(|i| {
            let mut row = vec![i.to_string()];
            row.extend(
                models
                    .iter()
                    .map(|m| format!("{:.4}", report.scores[*m][i])),
            );
            row
        })
        .collect();
    write!(out, "{}", format_table(&headers, &rows))?;
    writeln!(out)?;

    writeln!(out, "SHAP Feature Importance Summary")?;
    writeln!(out, "{RULE}")?;
    match &report.shap_summary {
        ShapSummary::Available { path } => writeln!(out, "SHAP Summary Plot: {}", path.display())?,
        ShapSummary::Missing { path } => writeln!(
            out,
            "Warning: SHAP summary plot not found ({})",
            path.display()
        )?,
    }
    Ok(())
}

/// Render the outcome of a single-patient prediction.
pub fn render_prediction<W: Write>(out: &mut W, prediction: &SinglePrediction) -> io::Result<()> {
    writeln!(
        out,
        "Predicted Risk Score ({}): {:.3}",
        prediction.model, prediction.risk_score
    )?;
    writeln!(out, "{}", prediction.label.description())
}

/// List every model with the artifact it would load.
pub fn render_model_status<W: Write>(out: &mut W, registry: &ModelRegistry) -> io::Result<()> {
    writeln!(out, "Models in {}", registry.models_dir().display())?;
    for name in ModelName::ALL {
        match registry.status(name) {
            ArtifactStatus::Present(path) => {
                writeln!(out, "  {:<14} {}", name.as_str(), path.display())?
            }
            ArtifactStatus::Absent(_) => writeln!(out, "  {:<14} not found", name.as_str())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskLabel, SkipReason, SkippedModel};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn entry(model: ModelName, mean_score: f64) -> RankingEntry {
        RankingEntry { model, mean_score }
    }

    fn report() -> BatchReport {
        let mut scores = BTreeMap::new();
        scores.insert(ModelName::Logistic, vec![0.2, 0.4]);
        scores.insert(ModelName::Xgboost, vec![0.6, 0.8]);
        BatchReport {
            report_id: "r-1".to_string(),
            generated_at: Utc::now(),
            row_count: 2,
            preview: TablePreview {
                headers: vec!["Glucose".into(), "Outcome".into()],
                rows: vec![vec!["148".into(), "1".into()], vec!["85".into(), "0".into()]],
            },
            best: entry(ModelName::Xgboost, 0.7),
            middle: None,
            worst: entry(ModelName::Logistic, 0.3),
            ranking: vec![entry(ModelName::Xgboost, 0.7), entry(ModelName::Logistic, 0.3)],
            scores,
            skipped: vec![SkippedModel {
                model: ModelName::Svm,
                reason: SkipReason::Missing,
            }],
            shap_summary: ShapSummary::Missing {
                path: PathBuf::from("reports/shap_summary.png"),
            },
        }
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let table = format_table(
            &["a".to_string(), "long".to_string()],
            &[vec!["xyz".to_string(), "1".to_string()]],
        );
        assert_eq!(table, "a    long\n---  ----\nxyz  1\n");
    }

    #[test]
    fn test_render_batch() {
        let mut out = Vec::new();
        render_batch(&mut out, &report()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Warning: Model not found: svm"));
        assert!(text.contains("Best Model:    xgboost (Avg Risk: 0.7)"));
        assert!(text.contains("Worst Model:   logistic (Avg Risk: 0.3)"));
        assert!(!text.contains("Average Model:"));
        assert!(text.contains("#  logistic  xgboost"));
        assert!(text.contains("1  0.4000    0.8000"));
        assert!(text.contains("Warning: SHAP summary plot not found"));
    }

    #[test]
    fn test_results_leave_out_preview() {
        let mut out = Vec::new();
        render_results(&mut out, &report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Uploaded Data Preview"));
        assert!(text.starts_with("Warning: Model not found: svm\n"));
    }

    #[test]
    fn test_render_prediction() {
        let prediction = SinglePrediction {
            model: ModelName::Svm,
            risk_score: 0.61234,
            label: RiskLabel::HighRisk,
        };
        let mut out = Vec::new();
        render_prediction(&mut out, &prediction).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Predicted Risk Score (svm): 0.612\n"));
        assert!(text.contains("High Risk"));
    }
}
