use crate::core::intake::PROTO_EXTENSION;
use crate::domain::model::{AliasTable, GenerationUnit};
use crate::utils::error::{GenError, Result};

/// 為 unit 的每個 import 配發 alias，並計算相對於目前檔案目錄的 import 路徑
///
/// alias 依 namespace 第一次出現的順序從 1 開始編號。任何路徑無法相對化時整個產生過程中止。
pub fn resolve_imports(unit: &mut GenerationUnit) -> Result<()> {
    let mut aliases = AliasTable::new();

    for import in &unit.imports {
        let alias = aliases.alias_for_package(&import.package);
        let path = relative_import_path(&unit.file_name, &import.path).map_err(|reason| {
            GenError::RelativePath {
                file: import.path.clone(),
                reason,
            }
        })?;

        tracing::debug!(
            "{}: import {} ({}) -> _{} as {}",
            unit.file_name,
            import.path,
            import.package,
            alias,
            path
        );
        aliases.insert(path, alias);
    }

    unit.aliases = aliases;
    Ok(())
}

/// `import_file` 相對於 `from_file` 所在目錄的路徑，去掉 `.proto`
pub fn relative_import_path(from_file: &str, import_file: &str) -> std::result::Result<String, String> {
    let from_dir = parent_dir(from_file);
    let import_dir = parent_dir(import_file);
    let base_name = import_file.rsplit('/').next().unwrap_or(import_file);

    let mut segments = relative_segments(from_dir, import_dir)?;
    segments.push(base_name.to_string());

    let joined = segments.join("/");
    Ok(joined
        .strip_suffix(PROTO_EXTENSION)
        .map(str::to_string)
        .unwrap_or(joined))
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => ".",
    }
}

/// 詞法上的路徑正規化：去掉 `.`，把 `a/..` 摺疊
fn clean(path: &str) -> (bool, Vec<&str>) {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                // 根目錄之上沒有東西
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    (rooted, segments)
}

fn relative_segments(base: &str, target: &str) -> std::result::Result<Vec<String>, String> {
    let (base_rooted, base_segments) = clean(base);
    let (target_rooted, target_segments) = clean(target);

    if base_rooted != target_rooted {
        return Err(format!("can't make {} relative to {}", target, base));
    }

    let common = base_segments
        .iter()
        .zip(target_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let remaining_base = &base_segments[common..];
    if remaining_base.contains(&"..") {
        return Err(format!("can't make {} relative to {}", target, base));
    }

    let mut segments: Vec<String> = remaining_base.iter().map(|_| "..".to_string()).collect();
    segments.extend(target_segments[common..].iter().map(|s| s.to_string()));
    Ok(segments)
}
