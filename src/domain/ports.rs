use crate::utils::error::Result;

/// 產生檔案的落地位置（本機目錄、測試用記憶體等）
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 產生的程式碼以 `use <runtime_path> as twirp;` 引入 runtime
    fn runtime_path(&self) -> &str;
    fn verbose(&self) -> bool;
}
