use crate::domain::model::RiskAssessment;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub assessment: RiskAssessment,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn new(assessment: RiskAssessment, model: impl Into<String>) -> Self {
        Self {
            assessment,
            model: model.into(),
            analyzed_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> crate::utils::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 純文字結果卡片
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.assessment;

        if a.is_high_risk() {
            writeln!(f, "⚠️ HIGH RISK")?;
        } else {
            writeln!(f, "✅ LOW RISK")?;
        }
        if !a.product_name().is_empty() {
            writeln!(f, "{}", a.product_name())?;
        }
        if let Some(kcal) = a.estimated_calories_kcal() {
            writeln!(f, "Estimated calories: {:.0} kcal", kcal)?;
        }

        writeln!(f, "---")?;
        writeln!(f, "{}", a.warning_message())?;

        if !a.key_risk_factors().is_empty() {
            writeln!(f, "---")?;
            for factor in a.key_risk_factors() {
                writeln!(f, "• {}", factor)?;
            }
        }

        writeln!(f, "---")?;
        write!(f, "Uncertainty: {}", a.uncertainty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RiskLevel, Uncertainty};

    fn sample(calories: Option<f64>, factors: Vec<String>) -> AnalysisReport {
        let assessment = RiskAssessment::new(
            "Cola".to_string(),
            RiskLevel::High,
            calories,
            "قلل من المشروبات الغازية".to_string(),
            factors,
            Uncertainty::Medium,
        )
        .unwrap();
        AnalysisReport::new(assessment, "gemini-1.5-flash")
    }

    #[test]
    fn test_render_text_card() {
        let text = sample(Some(139.6), vec!["sugar".to_string()]).render_text();
        assert!(text.starts_with("⚠️ HIGH RISK"));
        assert!(text.contains("Estimated calories: 140 kcal"));
        assert!(text.contains("• sugar"));
        assert!(text.ends_with("Uncertainty: MEDIUM"));
    }

    #[test]
    fn test_display_matches_text_card() {
        let report = sample(Some(10.0), vec!["salt".to_string()]);
        assert_eq!(format!("{}", report), report.render_text());
        assert!(report.render_text().starts_with("⚠️ HIGH RISK\nCola\n"));
    }

    #[test]
    fn test_render_text_omits_missing_fields() {
        let text = sample(None, vec![]).render_text();
        assert!(!text.contains("Estimated calories"));
        assert!(!text.contains('•'));
    }

    #[test]
    fn test_json_report_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample(None, vec![]).to_json().unwrap()).unwrap();
        assert_eq!(json["model"], "gemini-1.5-flash");
        assert_eq!(json["assessment"]["risk_level"], "HIGH");
        assert!(json["assessment"]["estimated_calories_kcal"].is_null());
        assert!(json["analyzed_at"].is_string());
    }
}
