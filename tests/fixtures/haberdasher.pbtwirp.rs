// Code generated by protoc-gen-rtwirp. DO NOT EDIT.
// source: example/haberdasher.proto

use rtwirp::runtime as twirp;
#[allow(unused_imports)]
use super::haberdasher::*;

/// A Haberdasher makes hats for clients.
#[twirp::async_trait]
pub trait Haberdasher: Send + Sync {
    /// MakeHat produces a hat of mysterious, randomly-selected color!
    #[allow(non_snake_case)]
    async fn makeHat(&self, ctx: twirp::Context, req: Size) -> Result<Hat, twirp::TwirpError>;
}

/// A Haberdasher makes hats for clients.
#[derive(Clone)]
pub struct HaberdasherJsonClient {
    client: twirp::RpcClient,
}

impl HaberdasherJsonClient {
    /// A Haberdasher makes hats for clients.
    pub fn new(base_url: &str, prefix: &str, options: twirp::ClientOptions) -> Self {
        Self {
            client: twirp::RpcClient::new(twirp::Transport::Json, base_url, prefix, options),
        }
    }
}

#[twirp::async_trait]
impl Haberdasher for HaberdasherJsonClient {
    #[allow(non_snake_case)]
    async fn makeHat(&self, ctx: twirp::Context, req: Size) -> Result<Hat, twirp::TwirpError> {
        let ctx = ctx
            .with_package_name("example")
            .with_service_name("Haberdasher")
            .with_method_name("MakeHat");
        self.client.call(ctx, "example.Haberdasher/MakeHat", req).await
    }
}

/// A Haberdasher makes hats for clients.
#[derive(Clone)]
pub struct HaberdasherProtobufClient {
    client: twirp::RpcClient,
}

impl HaberdasherProtobufClient {
    /// A Haberdasher makes hats for clients.
    pub fn new(base_url: &str, prefix: &str, options: twirp::ClientOptions) -> Self {
        Self {
            client: twirp::RpcClient::new(twirp::Transport::Protobuf, base_url, prefix, options),
        }
    }
}

#[twirp::async_trait]
impl Haberdasher for HaberdasherProtobufClient {
    #[allow(non_snake_case)]
    async fn makeHat(&self, ctx: twirp::Context, req: Size) -> Result<Hat, twirp::TwirpError> {
        let ctx = ctx
            .with_package_name("example")
            .with_service_name("Haberdasher")
            .with_method_name("MakeHat");
        self.client.call(ctx, "example.Haberdasher/MakeHat", req).await
    }
}
