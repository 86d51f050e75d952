use crate::domain::model::{RiskAssessment, RiskLevel, Uncertainty};
use crate::utils::error::NormalizationFailure;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

// 各欄位的同義鍵，依序嘗試，第一個存在且非 null 的鍵勝出
pub const PRODUCT_NAME_KEYS: &[&str] = &["product_name", "product", "name"];
pub const RISK_LEVEL_KEYS: &[&str] = &["risk_level", "risk"];
pub const CALORIES_KEYS: &[&str] = &["estimated_calories_kcal", "estimated_calories"];
pub const WARNING_KEYS: &[&str] = &["warning_ar", "warning", "message_ar"];
pub const RISK_FACTOR_KEYS: &[&str] = &["key_risk_factors", "risk_factors"];
pub const UNCERTAINTY_KEYS: &[&str] = &["uncertainty"];

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").expect("leading fence pattern is valid"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```$").expect("trailing fence pattern is valid"));

/// 欄位查找結果：缺席，或存在（值可能無效，由各欄位的轉換決定如何處理）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Present(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn lookup(object: &'a Map<String, Value>, keys: &[&str]) -> Self {
        keys.iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
            .map_or(FieldValue::Absent, FieldValue::Present)
    }

    fn string_form(self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Present(value) => Some(string_form(value)),
        }
    }
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 從模型輸出中取出最可能是 JSON 物件的片段，永不失敗
pub fn extract_json_candidate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_leading = LEADING_FENCE.replace(trimmed, "");
    let mut candidate = TRAILING_FENCE.replace(&without_leading, "").into_owned();

    // 模型常在 JSON 前後附加說明文字
    if let (Some(start), Some(end)) = (candidate.find('{'), candidate.rfind('}')) {
        if end > start {
            candidate = candidate[start..=end].to_string();
        }
    }

    candidate.trim().to_string()
}

fn coerce_risk_level(field: FieldValue<'_>) -> Option<RiskLevel> {
    let normalized = field.string_form()?.trim().to_uppercase();
    RiskLevel::from_normalized(&normalized)
}

fn coerce_calories(field: FieldValue<'_>) -> Option<f64> {
    let value = match field {
        FieldValue::Absent => None,
        FieldValue::Present(Value::Number(n)) => n.as_f64(),
        FieldValue::Present(Value::String(s)) => s.trim().parse::<f64>().ok(),
        FieldValue::Present(_) => None,
    };
    value.filter(|kcal| kcal.is_finite() && *kcal >= 0.0)
}

fn coerce_risk_factors(field: FieldValue<'_>) -> Vec<String> {
    let items: Vec<String> = match field {
        FieldValue::Present(Value::String(s)) => vec![s.clone()],
        FieldValue::Present(Value::Array(values)) => values.iter().map(string_form).collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect()
}

fn coerce_uncertainty(field: FieldValue<'_>) -> Uncertainty {
    field
        .string_form()
        .and_then(|s| Uncertainty::from_normalized(&s.trim().to_uppercase()))
        .unwrap_or_default()
}

/// 解析並驗證模型輸出。
///
/// 檢查順序固定：先形狀（空、JSON、物件），再風險等級，最後警告訊息。
/// 失敗以值回傳，供重試迴圈判斷。
pub fn parse_and_validate(text: &str) -> Result<RiskAssessment, NormalizationFailure> {
    let candidate = extract_json_candidate(text);
    if candidate.is_empty() {
        return Err(NormalizationFailure::EmptyResponse);
    }

    let data: Value =
        serde_json::from_str(&candidate).map_err(|_| NormalizationFailure::MalformedJson)?;
    let object = data.as_object().ok_or(NormalizationFailure::UnexpectedShape)?;

    let product_name = FieldValue::lookup(object, PRODUCT_NAME_KEYS)
        .string_form()
        .unwrap_or_default();
    let risk_level = coerce_risk_level(FieldValue::lookup(object, RISK_LEVEL_KEYS));
    let calories = coerce_calories(FieldValue::lookup(object, CALORIES_KEYS));
    let warning = FieldValue::lookup(object, WARNING_KEYS)
        .string_form()
        .unwrap_or_default();
    let risk_factors = coerce_risk_factors(FieldValue::lookup(object, RISK_FACTOR_KEYS));
    let uncertainty = coerce_uncertainty(FieldValue::lookup(object, UNCERTAINTY_KEYS));

    let risk_level = risk_level.ok_or(NormalizationFailure::InvalidRiskLevel)?;

    RiskAssessment::new(
        product_name,
        risk_level,
        calories,
        warning,
        risk_factors,
        uncertainty,
    )
    .ok_or(NormalizationFailure::MissingWarning)
}
