use crate::runtime::context::Context;
use crate::runtime::error::{ErrorCode, TwirpError};
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

/// 型別抹除後的 request / response
pub type Payload = Box<dyn Any + Send>;

/// 一次呼叫：收 Context 與 request，回傳 response
pub type Method =
    Arc<dyn Fn(Context, Payload) -> BoxFuture<'static, Result<Payload, TwirpError>> + Send + Sync>;

/// 包住下一個 Method 的轉換
pub type Interceptor = Arc<dyn Fn(Method) -> Method + Send + Sync>;

pub fn identity() -> Interceptor {
    Arc::new(|next: Method| next)
}

/// 依序串接；第一個 interceptor 在最外層
pub fn chain_interceptors(interceptors: Vec<Interceptor>) -> Interceptor {
    if interceptors.is_empty() {
        return identity();
    }

    Arc::new(move |next: Method| {
        interceptors
            .iter()
            .rev()
            .fold(next, |method, interceptor| interceptor(method))
    })
}

/// 用 async 函式寫 interceptor：`f(ctx, req, next)`
pub fn interceptor_fn<F, Fut>(f: F) -> Interceptor
where
    F: Fn(Context, Payload, Method) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Payload, TwirpError>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |next: Method| {
        let f = Arc::clone(&f);
        let method: Method = Arc::new(
            move |ctx: Context, req: Payload| -> BoxFuture<'static, Result<Payload, TwirpError>> {
                Box::pin((*f)(ctx, req, Arc::clone(&next)))
            },
        );
        method
    })
}

/// 取回 Payload 的實際型別；interceptor 換掉了型別時回傳 internal 錯誤
pub fn downcast_payload<T: Any>(payload: Payload, ctx: &Context) -> Result<T, TwirpError> {
    payload.downcast::<T>().map(|value| *value).map_err(|_| {
        TwirpError::new(
            ErrorCode::Internal,
            format!("interceptor produced a value that is not {}", std::any::type_name::<T>()),
            ctx.clone(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn echo() -> Method {
        Arc::new(
            |_ctx: Context, req: Payload| -> BoxFuture<'static, Result<Payload, TwirpError>> {
                Box::pin(async move { Ok(req) })
            },
        )
    }

    fn recording(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Interceptor {
        interceptor_fn(move |ctx, req, next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{} before", name));
                let result = next(ctx, req).await;
                log.lock().unwrap().push(format!("{} after", name));
                result
            }
        })
    }

    #[tokio::test]
    async fn test_identity_passes_through() {
        let method = identity()(echo());
        let out = method(Context::new(), Box::new(42u32)).await.unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), 42);

        let method = chain_interceptors(vec![])(echo());
        let out = method(Context::new(), Box::new("hi")).await.unwrap();
        assert_eq!(*out.downcast::<&str>().unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_chain_runs_first_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain_interceptors(vec![
            recording("outer", Arc::clone(&log)),
            recording("inner", Arc::clone(&log)),
        ]);

        chain(echo())(Context::new(), Box::new(1u8)).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer before", "inner before", "inner after", "outer after"]
        );
    }

    #[tokio::test]
    async fn test_interceptor_can_short_circuit() {
        let deny = interceptor_fn(|ctx: Context, _req: Payload, _next: Method| async move {
            Err(TwirpError::new(ErrorCode::PermissionDenied, "denied", ctx))
        });

        let err = deny(echo())(Context::new(), Box::new(())).await.unwrap_err();
        assert_eq!(err.msg, "denied");
    }

    #[test]
    fn test_downcast_payload_wrong_type() {
        let ctx = Context::new().with_method_name("MakeHat");
        let err = downcast_payload::<String>(Box::new(7i64), &ctx).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.context.method_name(), Some("MakeHat"));

        let value = downcast_payload::<i64>(Box::new(7i64), &ctx).unwrap();
        assert_eq!(value, 7);
    }
}
