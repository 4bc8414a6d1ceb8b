use crate::domain::ports::ConfigProvider;
use crate::utils::error::{GenError, Result};
use crate::utils::validation::{validate_path, validate_rust_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_RUNTIME_PATH: &str = "rtwirp::runtime";

/// 產生器設定，來源為 `--rtwirp_opt=` 參數字串，以及可選的 TOML 檔
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub runtime_path: String,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            verbose: false,
        }
    }
}

impl GeneratorConfig {
    /// 解析 protoc 傳來的參數，例如 `runtime_path=crate::twirp,verbose=true`
    ///
    /// 有 `config=<file>` 時先載入檔案，其餘參數再覆蓋檔案內容。
    pub fn from_parameter(parameter: Option<&str>) -> Result<Self> {
        let pairs = parse_parameter(parameter.unwrap_or_default());

        let mut config = match pairs.iter().find(|(key, _)| key == "config") {
            Some((_, path)) => {
                validate_path("config", path)?;
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        for (key, value) in pairs {
            match key.as_str() {
                "config" => {}
                "runtime_path" => config.runtime_path = value,
                "verbose" => config.verbose = parse_bool(&key, &value)?,
                // protoc-gen-go 系列的通用參數；輸出檔名本來就相對於來源檔
                "paths" | "module" => {
                    tracing::warn!("Ignoring plugin parameter {}={}", key, value);
                }
                _ if key.starts_with('M') => {
                    tracing::warn!("Ignoring import mapping {}={}", key, value);
                }
                _ => {
                    return Err(GenError::InvalidConfigValueError {
                        field: key,
                        value,
                        reason: "Unknown plugin parameter. Known: runtime_path, verbose, config"
                            .to_string(),
                    })
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GenError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RUNTIME_PATH})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

fn parse_parameter(parameter: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('=') {
            Some((key, value)) => pairs.push((key.trim().to_string(), value.trim().to_string())),
            // 只有 key 的旗標視為 true
            None => pairs.push((part.to_string(), "true".to_string())),
        }
    }
    pairs
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(GenError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected true or false".to_string(),
        }),
    }
}

impl ConfigProvider for GeneratorConfig {
    fn runtime_path(&self) -> &str {
        &self.runtime_path
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validate_rust_path("runtime_path", &self.runtime_path)
    }
}
