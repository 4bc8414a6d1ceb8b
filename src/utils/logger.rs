use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// protoc 以 stdout 接收回應，所以日誌一律寫到 stderr
pub fn init_plugin_logger(verbose: bool) {
    let default_filter = if verbose { "rtwirp=debug,info" } else { "rtwirp=warn" };
    let filter = EnvFilter::try_from_env("RTWIRP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 重複初始化（例如測試中）時忽略錯誤
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// JSON 格式，方便在 CI 中收集
pub fn init_json_logger() {
    let filter = EnvFilter::try_from_env("RTWIRP_LOG").unwrap_or_else(|_| EnvFilter::new("rtwirp=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .json(),
        )
        .try_init();
}
