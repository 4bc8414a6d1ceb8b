pub mod cli;
pub mod plugin_options;

pub use plugin_options::GeneratorConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// 直接執行時的命令列參數；由 protoc 呼叫時不需要任何參數
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "protoc-gen-rtwirp")]
#[command(about = "protoc plugin generating Twirp JSON/Protobuf clients for Rust", version)]
pub struct CliConfig {
    /// 從檔案讀取序列化的 CodeGeneratorRequest，而不是 stdin
    #[arg(long)]
    pub request: Option<String>,

    /// 把產生的檔案寫到此目錄，而不是把 CodeGeneratorResponse 寫到 stdout
    #[arg(long)]
    pub out_dir: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON on stderr")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        if let Some(request) = &self.request {
            crate::utils::validation::validate_path("request", request)?;
        }
        if let Some(out_dir) = &self.out_dir {
            crate::utils::validation::validate_path("out_dir", out_dir)?;
        }
        Ok(())
    }
}
