/// 對某個 message 型別的引用，已經對應到定義它的檔案與 namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// 完整名稱，例如 `.example.haberdasher.Hat`
    pub full_name: String,
    /// 定義此型別的 .proto 檔
    pub file: String,
    pub package: String,
    /// package 模組內的 Rust 型別路徑，巢狀 message 為 `outer::Inner`
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub input: TypeRef,
    pub output: TypeRef,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub package: String,
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
    pub comment: Option<String>,
}

impl ServiceDescriptor {
    /// `package.Service`，沒有 package 時只有 service 名稱
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// 檔案的一個 import：路徑與其 namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub path: String,
    pub package: String,
}

/// 相對 import 路徑 -> alias 編號
///
/// 編號屬於 namespace 而不是檔案：同一個 package 的多個檔案共用同一個 alias。
/// 保留插入順序，先看到的 namespace 拿到較小的編號。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, u32)>,
    packages: Vec<(String, u32)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得 namespace 的 alias，第一次看到時配發下一個編號
    pub fn alias_for_package(&mut self, package: &str) -> u32 {
        if let Some(alias) = self.lookup_package(package) {
            return alias;
        }
        let alias = self.packages.len() as u32 + 1;
        self.packages.push((package.to_string(), alias));
        alias
    }

    pub fn lookup_package(&self, package: &str) -> Option<u32> {
        self.packages
            .iter()
            .find(|(name, _)| name == package)
            .map(|(_, alias)| *alias)
    }

    /// 記錄 path -> alias；同一路徑重複出現時保留第一次的結果
    pub fn insert(&mut self, path: String, alias: u32) {
        if self.entries.iter().any(|(existing, _)| *existing == path) {
            return;
        }
        self.entries.push((path, alias));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(path, alias)| (path.as_str(), *alias))
    }

    /// 依 alias 分組的路徑，依 alias 編號排序
    pub fn grouped(&self) -> Vec<(u32, Vec<&str>)> {
        let mut groups: Vec<(u32, Vec<&str>)> = Vec::new();
        for (path, alias) in self.entries() {
            match groups.iter_mut().find(|(a, _)| *a == alias) {
                Some((_, paths)) => paths.push(path),
                None => groups.push((alias, vec![path])),
            }
        }
        groups.sort_by_key(|(alias, _)| *alias);
        groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 一個輸出檔所需的全部資料
#[derive(Debug, Clone)]
pub struct GenerationUnit {
    /// 原始 .proto 檔名，例如 `example/haberdasher.proto`
    pub file_name: String,
    /// 例如 `example/haberdasher.pbtwirp.rs`
    pub output_name: String,
    /// 去掉目錄與副檔名，例如 `haberdasher`
    pub proto_name: String,
    pub package: String,
    pub imports: Vec<ImportRecord>,
    pub aliases: AliasTable,
    pub services: Vec<ServiceDescriptor>,
}

/// 產生出來的檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}
