use crate::adapters::gemini::GeminiClient;
use crate::adapters::image::prepare_for_inference;
use crate::config::cli::LocalImageSource;
use crate::config::{OutputFormat, IMAGE_EXTENSIONS};
use crate::core::analyzer::RiskAnalyzer;
use crate::core::report::AnalysisReport;
use crate::core::{ConfigProvider, ImageSource};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, Validate};

/// 讀取影像檔、呼叫模型並產生報告
pub async fn analyze_image_file<C>(image_path: &str, config: &C) -> Result<AnalysisReport>
where
    C: ConfigProvider + Validate,
{
    config.validate()?;
    validate_file_extension("image", image_path, IMAGE_EXTENSIONS)?;

    let client = GeminiClient::from_config(config)?;
    let model = client.model_name().to_string();

    let bytes = LocalImageSource::new().read_image(image_path).await?;
    let image = prepare_for_inference(&bytes, config.max_image_edge())?;

    let analyzer = RiskAnalyzer::from_config(client, config);
    let assessment = analyzer.analyze(&image).await?;

    tracing::info!(
        "🏷️ Verdict: {} (uncertainty {})",
        assessment.risk_level(),
        assessment.uncertainty()
    );

    Ok(AnalysisReport::new(assessment, model))
}

pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => report.to_json(),
    }
}
