use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::time::Duration;

pub const PACKAGE_NAME_KEY: &str = "package_name";
pub const SERVICE_NAME_KEY: &str = "service_name";
pub const METHOD_NAME_KEY: &str = "method_name";

/// 每次呼叫攜帶的上下文
///
/// 不可變：每個 `with_*` 都回傳新的值，呼叫端原本的 Context 不受影響。
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn with_package_name(self, name: impl Into<String>) -> Self {
        self.with_value(PACKAGE_NAME_KEY, name)
    }

    pub fn package_name(&self) -> Option<&str> {
        self.value(PACKAGE_NAME_KEY)
    }

    pub fn with_service_name(self, name: impl Into<String>) -> Self {
        self.with_value(SERVICE_NAME_KEY, name)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.value(SERVICE_NAME_KEY)
    }

    pub fn with_method_name(self, name: impl Into<String>) -> Self {
        self.with_value(METHOD_NAME_KEY, name)
    }

    pub fn method_name(&self) -> Option<&str> {
        self.value(METHOD_NAME_KEY)
    }

    /// 附加要送出的 HTTP 標頭；`Accept` 與 `Content-Type` 之後會被 transport 覆蓋
    pub fn with_http_request_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    pub fn http_request_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 單次呼叫的逾時；client 本身不設任何逾時
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
