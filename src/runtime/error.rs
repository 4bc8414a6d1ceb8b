use crate::runtime::context::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Twirp 錯誤碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Canceled,
    Unknown,
    InvalidArgument,
    Malformed,
    DeadlineExceeded,
    NotFound,
    BadRoute,
    AlreadyExists,
    PermissionDenied,
    Unauthenticated,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Canceled => "canceled",
            ErrorCode::Unknown => "unknown",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::Malformed => "malformed",
            ErrorCode::DeadlineExceeded => "deadline_exceeded",
            ErrorCode::NotFound => "not_found",
            ErrorCode::BadRoute => "bad_route",
            ErrorCode::AlreadyExists => "already_exists",
            ErrorCode::PermissionDenied => "permission_denied",
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::ResourceExhausted => "resource_exhausted",
            ErrorCode::FailedPrecondition => "failed_precondition",
            ErrorCode::Aborted => "aborted",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::DataLoss => "data_loss",
        }
    }

    /// 不認得的錯誤碼一律視為 unknown
    pub fn parse(code: &str) -> Self {
        match code {
            "canceled" => ErrorCode::Canceled,
            "invalid_argument" => ErrorCode::InvalidArgument,
            "malformed" => ErrorCode::Malformed,
            "deadline_exceeded" => ErrorCode::DeadlineExceeded,
            "not_found" => ErrorCode::NotFound,
            "bad_route" => ErrorCode::BadRoute,
            "already_exists" => ErrorCode::AlreadyExists,
            "permission_denied" => ErrorCode::PermissionDenied,
            "unauthenticated" => ErrorCode::Unauthenticated,
            "resource_exhausted" => ErrorCode::ResourceExhausted,
            "failed_precondition" => ErrorCode::FailedPrecondition,
            "aborted" => ErrorCode::Aborted,
            "out_of_range" => ErrorCode::OutOfRange,
            "unimplemented" => ErrorCode::Unimplemented,
            "internal" => ErrorCode::Internal,
            "unavailable" => ErrorCode::Unavailable,
            "data_loss" => ErrorCode::DataLoss,
            _ => ErrorCode::Unknown,
        }
    }

    /// 回應不是 Twirp 錯誤格式時（例如代理伺服器回的錯誤），依 HTTP 狀態推斷
    pub fn from_intermediary_status(status: u16) -> Self {
        match status {
            300..=399 | 400 => ErrorCode::Internal,
            401 => ErrorCode::Unauthenticated,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::BadRoute,
            429 | 502 | 503 | 504 => ErrorCode::Unavailable,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 錯誤從哪裡產生；形狀都一樣，只是標記不同
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// 伺服器回了非 200，或 200 的內容無法解碼
    Response,
    /// 沒有拿到完整回應：連線失敗、逾時、讀取 body 失敗
    Connection,
    /// `ClientHooks::on_request_prepared` 失敗
    Hook,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    code: String,
    msg: String,
    #[serde(default)]
    meta: HashMap<String, String>,
}

/// 產生的 client 唯一的錯誤型別
#[derive(Debug, Clone, Error)]
#[error("twirp error {code}: {msg}")]
pub struct TwirpError {
    pub code: ErrorCode,
    pub msg: String,
    pub meta: HashMap<String, String>,
    pub origin: ErrorOrigin,
    /// 失敗呼叫的上下文（package / service / method）
    pub context: Context,
}

impl TwirpError {
    pub fn new(code: ErrorCode, msg: impl Into<String>, context: Context) -> Self {
        Self {
            code,
            msg: msg.into(),
            meta: HashMap::new(),
            origin: ErrorOrigin::Response,
            context,
        }
    }

    /// 解析 `{ "code", "msg", "meta" }` 錯誤格式
    pub fn from_json(value: serde_json::Value, context: Context) -> serde_json::Result<Self> {
        let envelope: ErrorEnvelope = serde_json::from_value(value)?;
        Ok(Self {
            code: ErrorCode::parse(&envelope.code),
            msg: envelope.msg,
            meta: envelope.meta,
            origin: ErrorOrigin::Response,
            context,
        })
    }

    /// 非 200 回應轉成錯誤；body 不是錯誤格式時改用 HTTP 狀態推斷
    pub fn from_response(status: u16, body: &[u8], context: Context) -> Self {
        let parsed = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| Self::from_json(value, context.clone()).ok());
        if let Some(err) = parsed {
            return err;
        }

        let code = ErrorCode::from_intermediary_status(status);
        let msg = format!(
            "Error from intermediary with HTTP status code {}: {}",
            status,
            String::from_utf8_lossy(body)
        );
        Self::new(code, msg, context)
            .with_meta("http_error_from_intermediary", "true")
            .with_meta("status_code", status.to_string())
    }

    pub fn from_connection_error(msg: impl Into<String>, context: Context) -> Self {
        Self {
            origin: ErrorOrigin::Connection,
            ..Self::new(ErrorCode::Unavailable, msg, context)
        }
    }

    pub fn from_hook_error(msg: impl Into<String>, context: Context) -> Self {
        Self {
            origin: ErrorOrigin::Hook,
            ..Self::new(ErrorCode::Internal, msg, context)
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn is_connection_error(&self) -> bool {
        self.origin == ErrorOrigin::Connection
    }

    pub fn is_hook_error(&self) -> bool {
        self.origin == ErrorOrigin::Hook
    }
}
