use crate::config::GeneratorConfig;
use crate::core::emitter::emit_unit;
use crate::core::imports::resolve_imports;
use crate::core::intake::{intake_file, TypeIndex};
use crate::domain::model::GeneratedFile;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{GenError, Result};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

/// 對 protoc 宣告支援的功能
pub const SUPPORTED_FEATURES: u64 = Feature::Proto3Optional as u64;

/// 逐檔產生 client 綁定：intake → import 解析 → 輸出
pub struct CodeGenerator<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> CodeGenerator<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    /// 任何一個檔案失敗就整批失敗，不回傳部分結果
    pub fn generate(&self, request: &CodeGeneratorRequest) -> Result<Vec<GeneratedFile>> {
        let index = TypeIndex::build(&request.proto_file);
        tracing::debug!(
            "🔍 Indexed {} message types across {} files",
            index.len(),
            request.proto_file.len()
        );

        let mut generated = Vec::new();
        for file_name in &request.file_to_generate {
            let file = request
                .proto_file
                .iter()
                .find(|file| file.name() == file_name.as_str())
                .ok_or_else(|| GenError::MalformedDescriptor {
                    file: file_name.clone(),
                    message: "file_to_generate entry has no matching descriptor".to_string(),
                })?;

            let Some(mut unit) = intake_file(file, &index)? else {
                continue;
            };
            resolve_imports(&mut unit)?;
            let content = emit_unit(&unit, self.config.runtime_path())?;

            tracing::info!(
                "📝 Generated {} ({} services, {} aliases)",
                unit.output_name,
                unit.services.len(),
                unit.aliases.grouped().len()
            );
            generated.push(GeneratedFile {
                name: unit.output_name,
                content,
            });
        }

        Ok(generated)
    }
}

pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest> {
    Ok(CodeGeneratorRequest::decode(bytes)?)
}

pub fn encode_response(response: &CodeGeneratorResponse) -> Vec<u8> {
    response.encode_to_vec()
}

/// 處理一個完整的 protoc 請求
///
/// 只有請求本身無法解碼時回傳 `Err`；設定錯誤與產生錯誤都放進 response 的 `error` 欄位，
/// 由 protoc 顯示給使用者。
pub fn process_request(bytes: &[u8]) -> Result<CodeGeneratorResponse> {
    let request = decode_request(bytes)?;
    Ok(respond(&request))
}

pub fn respond(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    tracing::info!(
        "🚀 protoc requested {} files (parameter: {:?})",
        request.file_to_generate.len(),
        request.parameter()
    );

    let result = GeneratorConfig::from_parameter(request.parameter.as_deref())
        .and_then(|config| CodeGenerator::new(config).generate(request));
    build_response(result)
}

pub fn build_response(result: Result<Vec<GeneratedFile>>) -> CodeGeneratorResponse {
    match result {
        Ok(files) => CodeGeneratorResponse {
            supported_features: Some(SUPPORTED_FEATURES),
            file: files
                .into_iter()
                .map(|file| File {
                    name: Some(file.name),
                    content: Some(file.content),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
        Err(e) => {
            tracing::error!("❌ Generation failed: {} (Category: {:?})", e, e.category());
            CodeGeneratorResponse {
                error: Some(e.to_string()),
                supported_features: Some(SUPPORTED_FEATURES),
                ..Default::default()
            }
        }
    }
}

/// 把 response 內的檔案寫到存儲；response 帶錯誤時不寫任何檔案
pub async fn write_response<S: Storage>(storage: &S, response: &CodeGeneratorResponse) -> Result<usize> {
    if let Some(error) = &response.error {
        return Err(GenError::GenerationFailed(error.clone()));
    }

    for file in &response.file {
        storage.write_file(file.name(), file.content().as_bytes()).await?;
        tracing::info!("💾 Wrote {}", file.name());
    }
    Ok(response.file.len())
}
