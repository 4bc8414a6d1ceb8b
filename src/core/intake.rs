use crate::domain::model::{
    AliasTable, GenerationUnit, ImportRecord, MethodDescriptor, ServiceDescriptor, TypeRef,
};
use crate::utils::error::{GenError, Result};
use prost_types::{DescriptorProto, FileDescriptorProto, SourceCodeInfo};
use std::collections::HashMap;

pub const PROTO_EXTENSION: &str = ".proto";
pub const OUTPUT_SUFFIX: &str = ".pbtwirp.rs";

// FileDescriptorProto / ServiceDescriptorProto 的欄位編號，用於 SourceCodeInfo 路徑
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// request 中所有檔案的 message 型別索引
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: HashMap<String, TypeRef>,
    packages: HashMap<String, String>,
}

impl TypeIndex {
    pub fn build(files: &[FileDescriptorProto]) -> Self {
        let mut index = Self::default();
        for file in files {
            index
                .packages
                .insert(file.name().to_string(), file.package().to_string());
            for message in &file.message_type {
                index.add_message(file, &[], message);
            }
        }
        index
    }

    fn add_message(&mut self, file: &FileDescriptorProto, parents: &[&str], message: &DescriptorProto) {
        let mut proto_path: Vec<&str> = parents.to_vec();
        proto_path.push(message.name());

        let full_name = if file.package().is_empty() {
            format!(".{}", proto_path.join("."))
        } else {
            format!(".{}.{}", file.package(), proto_path.join("."))
        };

        // 巢狀 message 放在以外層 message 命名的模組中
        let mut rust_path: Vec<String> = parents.iter().map(|p| to_snake_case(p)).collect();
        rust_path.push(message.name().to_string());

        self.types.insert(
            full_name.clone(),
            TypeRef {
                full_name,
                file: file.name().to_string(),
                package: file.package().to_string(),
                name: rust_path.join("::"),
            },
        );

        for nested in &message.nested_type {
            self.add_message(file, &proto_path, nested);
        }
    }

    pub fn resolve(&self, full_name: &str) -> Option<&TypeRef> {
        self.types.get(full_name)
    }

    pub fn package_of(&self, file_name: &str) -> Option<&str> {
        self.packages.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// 把一個 FileDescriptorProto 轉成 GenerationUnit 骨架
///
/// 沒有 service 的檔案回傳 `None`，不產生任何輸出。alias 表在此階段是空的。
pub fn intake_file(file: &FileDescriptorProto, index: &TypeIndex) -> Result<Option<GenerationUnit>> {
    let file_name = file.name();
    if file_name.is_empty() {
        return Err(GenError::MalformedDescriptor {
            file: "<unnamed>".to_string(),
            message: "file descriptor has no name".to_string(),
        });
    }

    if file.service.is_empty() {
        tracing::debug!("Skipping {}: no services", file_name);
        return Ok(None);
    }

    let imports = file
        .dependency
        .iter()
        .map(|dependency| {
            let package = index.package_of(dependency).ok_or_else(|| GenError::MalformedDescriptor {
                file: file_name.to_string(),
                message: format!("imported file {} is missing from the request", dependency),
            })?;
            Ok(ImportRecord {
                path: dependency.clone(),
                package: package.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut services = Vec::with_capacity(file.service.len());
    for (service_index, service) in file.service.iter().enumerate() {
        let mut methods = Vec::with_capacity(service.method.len());
        for (method_index, method) in service.method.iter().enumerate() {
            if method.client_streaming() || method.server_streaming() {
                return Err(GenError::MalformedDescriptor {
                    file: file_name.to_string(),
                    message: format!(
                        "{}.{} is a streaming method; only unary methods are supported",
                        service.name(),
                        method.name()
                    ),
                });
            }

            let path = [
                FILE_SERVICE_FIELD,
                service_index as i32,
                SERVICE_METHOD_FIELD,
                method_index as i32,
            ];
            methods.push(MethodDescriptor {
                name: method.name().to_string(),
                input: resolve_type(index, file_name, method.input_type())?,
                output: resolve_type(index, file_name, method.output_type())?,
                comment: leading_comment(file.source_code_info.as_ref(), &path),
            });
        }

        services.push(ServiceDescriptor {
            package: file.package().to_string(),
            name: service.name().to_string(),
            methods,
            comment: leading_comment(
                file.source_code_info.as_ref(),
                &[FILE_SERVICE_FIELD, service_index as i32],
            ),
        });
    }

    let base_name = file_name.strip_suffix(PROTO_EXTENSION).unwrap_or(file_name);
    let proto_name = base_name.rsplit('/').next().unwrap_or(base_name).to_string();

    Ok(Some(GenerationUnit {
        file_name: file_name.to_string(),
        output_name: format!("{}{}", base_name, OUTPUT_SUFFIX),
        proto_name,
        package: file.package().to_string(),
        imports,
        aliases: AliasTable::new(),
        services,
    }))
}

fn resolve_type(index: &TypeIndex, file_name: &str, full_name: &str) -> Result<TypeRef> {
    index
        .resolve(full_name)
        .cloned()
        .ok_or_else(|| GenError::MalformedDescriptor {
            file: file_name.to_string(),
            message: format!("message type {} is not defined in the request", full_name),
        })
}

fn leading_comment(info: Option<&SourceCodeInfo>, path: &[i32]) -> Option<String> {
    info?
        .location
        .iter()
        .find(|location| location.path == path)
        .and_then(|location| location.leading_comments.as_deref())
        .map(str::trim_end)
        .filter(|comment| !comment.trim().is_empty())
        .map(str::to_string)
}

/// prost 對巢狀模組使用的 snake_case
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = if i > 0 { chars.get(i - 1) } else { None };
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if *p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
