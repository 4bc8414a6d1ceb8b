use crate::domain::model::{GenerationUnit, MethodDescriptor, ServiceDescriptor, TypeRef};
use crate::utils::error::{GenError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;

pub const GENERATOR_NAME: &str = "protoc-gen-rtwirp";

/// 兩種 client 變體：類型名稱後綴與對應的 runtime Transport
const CLIENT_VARIANTS: [(&str, &str); 2] = [("JsonClient", "Json"), ("ProtobufClient", "Protobuf")];

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// 不能寫成 raw identifier 的關鍵字
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// 把 GenerationUnit 渲染成 Rust 原始碼
pub struct BindingEmitter<'a> {
    unit: &'a GenerationUnit,
    runtime_path: &'a str,
    out: String,
}

impl<'a> BindingEmitter<'a> {
    pub fn new(unit: &'a GenerationUnit, runtime_path: &'a str) -> Self {
        Self {
            unit,
            runtime_path,
            out: String::with_capacity(4096),
        }
    }

    pub fn emit(mut self) -> Result<String> {
        self.write_header()?;
        self.write_imports()?;

        let unit = self.unit;
        for service in &unit.services {
            self.write_service_trait(service)?;
        }
        for service in &unit.services {
            for (suffix, transport) in CLIENT_VARIANTS {
                self.write_client(service, suffix, transport)?;
            }
        }

        Ok(self.out)
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "// Code generated by {}. DO NOT EDIT.", GENERATOR_NAME)?;
        writeln!(self.out, "// source: {}", self.unit.file_name)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_imports(&mut self) -> Result<()> {
        writeln!(self.out, "use {} as twirp;", self.runtime_path)?;
        writeln!(self.out, "#[allow(unused_imports)]")?;
        writeln!(self.out, "use super::{}::*;", rust_ident(&self.unit.proto_name))?;

        for (alias, paths) in self.unit.aliases.grouped() {
            writeln!(self.out)?;
            writeln!(self.out, "#[allow(unused_imports)]")?;
            writeln!(self.out, "pub mod _{} {{", alias)?;
            for path in paths {
                writeln!(self.out, "    pub use super::super::{}::*;", import_module_path(path))?;
            }
            writeln!(self.out, "}}")?;
        }
        Ok(())
    }

    fn write_service_trait(&mut self, service: &ServiceDescriptor) -> Result<()> {
        self.check_method_names(service)?;

        writeln!(self.out)?;
        write_doc_comment(&mut self.out, "", service.comment.as_deref())?;
        writeln!(self.out, "#[twirp::async_trait]")?;
        writeln!(self.out, "pub trait {}: Send + Sync {{", service.name)?;
        for (i, method) in service.methods.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            write_doc_comment(&mut self.out, "    ", method.comment.as_deref())?;
            let signature = self.method_signature(method)?;
            writeln!(self.out, "    #[allow(non_snake_case)]")?;
            writeln!(self.out, "    {};", signature)?;
        }
        writeln!(self.out, "}}")?;
        Ok(())
    }

    fn write_client(&mut self, service: &ServiceDescriptor, suffix: &str, transport: &str) -> Result<()> {
        let client_name = format!("{}{}", service.name, suffix);
        let comment = service.comment.as_deref();

        writeln!(self.out)?;
        write_doc_comment(&mut self.out, "", comment)?;
        writeln!(self.out, "#[derive(Clone)]")?;
        writeln!(self.out, "pub struct {} {{", client_name)?;
        writeln!(self.out, "    client: twirp::RpcClient,")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out)?;

        writeln!(self.out, "impl {} {{", client_name)?;
        write_doc_comment(&mut self.out, "    ", comment)?;
        writeln!(
            self.out,
            "    pub fn new(base_url: &str, prefix: &str, options: twirp::ClientOptions) -> Self {{"
        )?;
        writeln!(self.out, "        Self {{")?;
        writeln!(
            self.out,
            "            client: twirp::RpcClient::new(twirp::Transport::{}, base_url, prefix, options),",
            transport
        )?;
        writeln!(self.out, "        }}")?;
        writeln!(self.out, "    }}")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out)?;

        writeln!(self.out, "#[twirp::async_trait]")?;
        writeln!(self.out, "impl {} for {} {{", service.name, client_name)?;
        for (i, method) in service.methods.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            let signature = self.method_signature(method)?;
            writeln!(self.out, "    #[allow(non_snake_case)]")?;
            writeln!(self.out, "    {} {{", signature)?;
            writeln!(self.out, "        let ctx = ctx")?;
            writeln!(self.out, "            .with_package_name({:?})", service.package)?;
            writeln!(self.out, "            .with_service_name({:?})", service.name)?;
            writeln!(self.out, "            .with_method_name({:?});", method.name)?;
            writeln!(
                self.out,
                "        self.client.call(ctx, {:?}, req).await",
                format!("{}/{}", service.full_name(), method.name)
            )?;
            writeln!(self.out, "    }}")?;
        }
        writeln!(self.out, "}}")?;
        Ok(())
    }

    /// `Get` 與 `get` 會產生同名的 Rust 方法
    fn check_method_names(&self, service: &ServiceDescriptor) -> Result<()> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for method in &service.methods {
            let ident = rust_ident(&lower_first_letter(&method.name));
            if let Some(first) = seen.get(&ident) {
                return Err(GenError::DuplicateMethod {
                    file: self.unit.file_name.clone(),
                    service: service.full_name(),
                    first: first.to_string(),
                    second: method.name.clone(),
                    ident,
                });
            }
            seen.insert(ident, &method.name);
        }
        Ok(())
    }

    fn method_signature(&self, method: &MethodDescriptor) -> Result<String> {
        Ok(format!(
            "async fn {}(&self, ctx: twirp::Context, req: {}) -> Result<{}, twirp::TwirpError>",
            rust_ident(&lower_first_letter(&method.name)),
            self.render_type(&method.input)?,
            self.render_type(&method.output)?,
        ))
    }

    /// 本檔案定義的型別用原名，其他檔案的型別加上 namespace alias
    fn render_type(&self, type_ref: &TypeRef) -> Result<String> {
        if type_ref.file == self.unit.file_name {
            return Ok(type_ref.name.clone());
        }

        match self.unit.aliases.lookup_package(&type_ref.package) {
            Some(alias) => Ok(format!("_{}::{}", alias, type_ref.name)),
            None => Err(GenError::UnresolvedType {
                file: self.unit.file_name.clone(),
                type_name: type_ref.full_name.clone(),
            }),
        }
    }
}

pub fn emit_unit(unit: &GenerationUnit, runtime_path: &str) -> Result<String> {
    BindingEmitter::new(unit, runtime_path).emit()
}

pub fn lower_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 空的或只有空白的註解不輸出任何東西
///
/// 縮排四格以上的段落在 rustdoc 中是程式碼區塊，會被當成 doctest 編譯，
/// 因此包在 ```` ```text ```` 裡。
fn write_doc_comment(out: &mut String, indent: &str, comment: Option<&str>) -> Result<()> {
    let Some(comment) = comment.filter(|c| !c.trim().is_empty()) else {
        return Ok(());
    };

    let mut in_fence = false;
    let mut blank_lines = 0;
    for line in comment.trim_end().lines().map(str::trim_end) {
        if line.is_empty() {
            blank_lines += 1;
            continue;
        }

        let code = is_indented_code(line);
        if in_fence && !code {
            writeln!(out, "{}/// ```", indent)?;
            in_fence = false;
        }
        for _ in 0..blank_lines {
            writeln!(out, "{}///", indent)?;
        }
        blank_lines = 0;
        if code && !in_fence {
            writeln!(out, "{}/// ```text", indent)?;
            in_fence = true;
        }
        writeln!(out, "{}///{}", indent, line)?;
    }
    if in_fence {
        writeln!(out, "{}/// ```", indent)?;
    }
    Ok(())
}

// protoc 保留 `//` 之後的第一個空白
fn is_indented_code(line: &str) -> bool {
    let body = line.strip_prefix(' ').unwrap_or(line);
    body.starts_with("    ") || body.starts_with('\t')
}

/// 把任意片段轉成合法的 Rust 識別字
pub fn rust_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if RESERVED_PATH_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// `../common/money` -> `super::common::money`，相對於產生的模組所在的目錄模組
fn import_module_path(relative: &str) -> String {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(|segment| {
            if segment == ".." {
                "super".to_string()
            } else {
                rust_ident(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("::")
}
