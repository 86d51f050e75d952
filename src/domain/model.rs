use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    High,
}

impl RiskLevel {
    /// 接受已 trim、大寫化的值，並處理 `LOW RISK` / `HIGH_RISK` 等同義寫法
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "LOW" | "LOW RISK" | "LOW_RISK" => Some(RiskLevel::Low),
            "HIGH" | "HIGH RISK" | "HIGH_RISK" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uncertainty {
    Low,
    #[default]
    Medium,
    High,
}

impl Uncertainty {
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(Uncertainty::Low),
            "MEDIUM" => Some(Uncertainty::Medium),
            "HIGH" => Some(Uncertainty::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Uncertainty::Low => "LOW",
            Uncertainty::Medium => "MEDIUM",
            Uncertainty::High => "HIGH",
        }
    }
}

impl fmt::Display for Uncertainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 經過驗證的風險評估結果。
///
/// 欄位為私有，只能透過 [`RiskAssessment::new`] 建立，
/// 因此 `risk_level` 必定有效且 `warning_message` 必定非空白。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    product_name: String,
    risk_level: RiskLevel,
    estimated_calories_kcal: Option<f64>,
    warning_message: String,
    key_risk_factors: Vec<String>,
    uncertainty: Uncertainty,
}

impl RiskAssessment {
    /// 警告訊息 trim 後為空時回傳 `None`
    pub fn new(
        product_name: String,
        risk_level: RiskLevel,
        estimated_calories_kcal: Option<f64>,
        warning_message: String,
        key_risk_factors: Vec<String>,
        uncertainty: Uncertainty,
    ) -> Option<Self> {
        let warning_message = warning_message.trim().to_string();
        if warning_message.is_empty() {
            return None;
        }

        Some(Self {
            product_name,
            risk_level,
            estimated_calories_kcal: estimated_calories_kcal.filter(|c| c.is_finite() && *c >= 0.0),
            warning_message,
            key_risk_factors,
            uncertainty,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn estimated_calories_kcal(&self) -> Option<f64> {
        self.estimated_calories_kcal
    }

    pub fn warning_message(&self) -> &str {
        &self.warning_message
    }

    pub fn key_risk_factors(&self) -> &[String] {
        &self.key_risk_factors
    }

    pub fn uncertainty(&self) -> Uncertainty {
        self.uncertainty
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}

/// 傳給推論服務的影像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InferenceImage {
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_synonyms() {
        assert_eq!(RiskLevel::from_normalized("LOW"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_normalized("LOW RISK"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_normalized("HIGH_RISK"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_normalized("MEDIUM"), None);
        assert_eq!(RiskLevel::from_normalized(""), None);
    }

    #[test]
    fn test_assessment_rejects_blank_warning() {
        let assessment = RiskAssessment::new(
            String::new(),
            RiskLevel::Low,
            None,
            "   ".to_string(),
            vec![],
            Uncertainty::Medium,
        );
        assert!(assessment.is_none());
    }

    #[test]
    fn test_assessment_drops_negative_calories() {
        let assessment = RiskAssessment::new(
            "Chips".to_string(),
            RiskLevel::High,
            Some(-10.0),
            " تحذير ".to_string(),
            vec![],
            Uncertainty::High,
        )
        .unwrap();
        assert_eq!(assessment.estimated_calories_kcal(), None);
        assert_eq!(assessment.warning_message(), "تحذير");
        assert!(assessment.is_high_risk());
    }

    #[test]
    fn test_assessment_serializes_uppercase_enums() {
        let assessment = RiskAssessment::new(
            "Soda".to_string(),
            RiskLevel::High,
            Some(140.0),
            "سكر مرتفع".to_string(),
            vec!["sugar".to_string()],
            Uncertainty::Low,
        )
        .unwrap();
        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["risk_level"], "HIGH");
        assert_eq!(json["uncertainty"], "LOW");
        assert_eq!(json["estimated_calories_kcal"], 140.0);
    }
}
