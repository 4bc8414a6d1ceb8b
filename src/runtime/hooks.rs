use crate::runtime::context::Context;
use crate::runtime::error::TwirpError;

/// client 在呼叫流程中的通知點；預設全部不做事
pub trait ClientHooks: Send + Sync {
    /// request 組好、送出前呼叫。可以修改標頭或 body，回傳的 Context 會用於後續流程。
    fn on_request_prepared(
        &self,
        ctx: Context,
        _request: &mut reqwest::Request,
    ) -> anyhow::Result<Context> {
        Ok(ctx)
    }

    /// 200 回應的 body 讀完之後呼叫
    fn on_response_received(&self, _ctx: &Context) {}

    /// 每次失敗的呼叫恰好呼叫一次，不會攔下錯誤
    fn on_error(&self, _ctx: &Context, _err: &TwirpError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ClientHooks for NoopHooks {}
