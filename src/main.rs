use bioguard::app::{analyze_image_file, render};
use bioguard::utils::error::{BioGuardError, ErrorSeverity};
use bioguard::utils::logger;
use bioguard::{CliConfig, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let outcome = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(toml_config) => {
                logger::init_logger(cli.verbose || toml_config.verbose(), cli.log_format);
                let toml_config = toml_config.with_cli_api_key(cli.api_key.clone());
                tracing::info!("📁 Loaded configuration from: {}", path);
                let format = toml_config.output_format();
                analyze_image_file(&cli.image, &toml_config)
                    .await
                    .and_then(|report| render(&report, format))
            }
            Err(e) => {
                logger::init_logger(cli.verbose, cli.log_format);
                Err(e)
            }
        },
        None => {
            logger::init_logger(cli.verbose, cli.log_format);
            if cli.verbose {
                tracing::debug!("CLI config: {:?}", cli);
            }
            analyze_image_file(&cli.image, &cli)
                .await
                .and_then(|report| render(&report, cli.output))
        }
    };

    match outcome {
        Ok(output) => println!("{}", output),
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: BioGuardError) -> ! {
    tracing::error!(
        "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 使用者只看到非技術性訊息
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
