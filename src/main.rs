use clap::Parser;
use rtwirp::core::generator::{decode_request, encode_response, respond, write_response};
use rtwirp::core::{ConfigProvider, Storage};
use rtwirp::utils::error::{ErrorSeverity, GenError};
use rtwirp::utils::{logger, validation::Validate};
use rtwirp::{CliConfig, GeneratorConfig, LocalStorage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if let Err(e) = run(&config).await {
        // 日誌可能還沒初始化
        logger::init_plugin_logger(config.verbose);
        tracing::error!(
            "❌ protoc-gen-rtwirp failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), GenError> {
    config.validate()?;

    let bytes = match &config.request {
        Some(path) => LocalStorage::new(".".to_string()).read_file(path).await?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };
    let request = decode_request(&bytes)?;

    // 參數中的 verbose=true 也會打開除錯日誌；設定錯誤留給 respond 回報
    let verbose = config.verbose
        || GeneratorConfig::from_parameter(request.parameter.as_deref())
            .map(|c| c.verbose())
            .unwrap_or(false);
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_plugin_logger(verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let response = respond(&request);

    match &config.out_dir {
        Some(out_dir) => {
            let storage = LocalStorage::new(out_dir.clone());
            let count = write_response(&storage, &response).await?;
            tracing::info!("✅ Wrote {} files to {}", count, out_dir);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&encode_response(&response)).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
