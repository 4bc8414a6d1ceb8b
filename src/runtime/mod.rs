//! 產生的 `*.pbtwirp.rs` 連結的 client runtime
//!
//! 產生的程式碼以 `use <runtime_path> as twirp;` 引入本模組，只使用這裡 re-export 的名稱。

pub mod client;
pub mod context;
pub mod error;
pub mod hooks;
pub mod interceptor;

pub use async_trait::async_trait;
pub use client::{ClientOptions, RpcClient, Transport, TwirpMessage};
pub use context::Context;
pub use error::{ErrorCode, ErrorOrigin, TwirpError};
pub use hooks::{ClientHooks, NoopHooks};
pub use interceptor::{chain_interceptors, interceptor_fn, Interceptor, Method, Payload};
