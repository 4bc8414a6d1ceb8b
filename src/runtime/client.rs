use crate::runtime::context::Context;
use crate::runtime::error::{ErrorCode, TwirpError};
use crate::runtime::hooks::{ClientHooks, NoopHooks};
use crate::runtime::interceptor::{downcast_payload, identity, Interceptor, Method, Payload};
use futures::future::BoxFuture;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// 產生的 request / response 型別需要同時支援兩種編碼
pub trait TwirpMessage:
    prost::Message + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
}

impl<T> TwirpMessage for T where
    T: prost::Message + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Json,
    Protobuf,
}

impl Transport {
    pub fn content_type(&self) -> &'static str {
        match self {
            Transport::Json => "application/json",
            Transport::Protobuf => "application/protobuf",
        }
    }

    pub fn encode<M: TwirpMessage>(&self, message: &M) -> Result<Vec<u8>, String> {
        match self {
            Transport::Json => serde_json::to_vec(message).map_err(|e| e.to_string()),
            Transport::Protobuf => Ok(message.encode_to_vec()),
        }
    }

    pub fn decode<M: TwirpMessage>(&self, bytes: &[u8]) -> Result<M, String> {
        match self {
            Transport::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Transport::Protobuf => M::decode(bytes).map_err(|e| e.to_string()),
        }
    }
}

/// 建構 client 的選項
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub hooks: Option<Arc<dyn ClientHooks>>,
    pub interceptor: Option<Interceptor>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ClientHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptor = Some(interceptor);
        self
    }
}

/// 產生的 JsonClient / ProtobufClient 共用的呼叫流程
///
/// 建構後不可變；同一個 client 可以同時發出多個呼叫。
#[derive(Clone)]
pub struct RpcClient {
    transport: Transport,
    base_url: String,
    prefix: String,
    hooks: Arc<dyn ClientHooks>,
    interceptor: Interceptor,
}

impl RpcClient {
    pub fn new(transport: Transport, base_url: &str, prefix: &str, options: ClientOptions) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let mut prefix = prefix.to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        // 空的 prefix 會變成 "/"，去掉開頭斜線後剛好為空
        let prefix = prefix.trim_start_matches('/').to_string();

        Self {
            transport,
            base_url,
            prefix,
            hooks: options.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
            interceptor: options.interceptor.unwrap_or_else(identity),
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `route` 形如 `package.Service/Method`
    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}{}", self.base_url, self.prefix, route)
    }

    /// 執行一次呼叫：經過 interceptor 後送出 request
    pub async fn call<Req, Resp>(&self, ctx: Context, route: &str, req: Req) -> Result<Resp, TwirpError>
    where
        Req: TwirpMessage,
        Resp: TwirpMessage,
    {
        let client = self.clone();
        let route = route.to_string();
        let method: Method = Arc::new(
            move |ctx: Context, payload: Payload| -> BoxFuture<'static, Result<Payload, TwirpError>> {
                let client = client.clone();
                let route = route.clone();
                Box::pin(async move {
                    let req = downcast_payload::<Req>(payload, &ctx)?;
                    let resp = client.dispatch::<Req, Resp>(ctx, &route, &req).await?;
                    Ok(Box::new(resp) as Payload)
                })
            },
        );

        let wrapped = (self.interceptor)(method);
        let out = wrapped(ctx.clone(), Box::new(req)).await?;
        downcast_payload::<Resp>(out, &ctx)
    }

    async fn dispatch<Req, Resp>(&self, ctx: Context, route: &str, req: &Req) -> Result<Resp, TwirpError>
    where
        Req: TwirpMessage,
        Resp: TwirpMessage,
    {
        match self.exchange(ctx, route, req).await {
            Ok(resp) => Ok(resp),
            Err(err) => {
                tracing::debug!("❌ {} failed: {}", route, err);
                self.hooks.on_error(&err.context, &err);
                Err(err)
            }
        }
    }

    async fn exchange<Req, Resp>(&self, ctx: Context, route: &str, req: &Req) -> Result<Resp, TwirpError>
    where
        Req: TwirpMessage,
        Resp: TwirpMessage,
    {
        let url = Url::parse(&self.url_for(route)).map_err(|e| {
            TwirpError::new(ErrorCode::Internal, format!("invalid request url: {}", e), ctx.clone())
        })?;
        let body = self.transport.encode(req).map_err(|e| {
            TwirpError::new(ErrorCode::Internal, format!("failed to encode request: {}", e), ctx.clone())
        })?;

        let content_type = HeaderValue::from_static(self.transport.content_type());
        let mut request = reqwest::Request::new(reqwest::Method::POST, url);
        let headers = request.headers_mut();
        for (name, value) in ctx.http_request_headers() {
            headers.append(name.clone(), value.clone());
        }
        headers.insert(ACCEPT, content_type.clone());
        headers.insert(CONTENT_TYPE, content_type);
        *request.body_mut() = Some(body.into());
        *request.timeout_mut() = ctx.timeout();

        let fallback = ctx.clone();
        let ctx = self
            .hooks
            .on_request_prepared(ctx, &mut request)
            .map_err(|e| TwirpError::from_hook_error(e.to_string(), fallback))?;

        tracing::debug!("📡 POST {}", request.url());

        // 每次呼叫各自建立，離開函式時一併釋放
        let http = reqwest::Client::new();
        let response = http
            .execute(request)
            .await
            .map_err(|e| connection_error(e, &ctx))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| connection_error(e, &ctx))?;

        tracing::debug!("📡 {} responded {} ({} bytes)", route, status, bytes.len());

        if status != StatusCode::OK {
            return Err(TwirpError::from_response(status.as_u16(), &bytes, ctx));
        }

        self.hooks.on_response_received(&ctx);
        self.transport.decode(&bytes).map_err(|e| {
            TwirpError::new(ErrorCode::Internal, format!("failed to decode response: {}", e), ctx)
        })
    }
}

fn connection_error(err: reqwest::Error, ctx: &Context) -> TwirpError {
    let timed_out = err.is_timeout();
    let err = TwirpError::from_connection_error(err.to_string(), ctx.clone());
    if timed_out {
        err.with_code(ErrorCode::DeadlineExceeded)
    } else {
        err
    }
}
