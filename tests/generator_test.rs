use anyhow::Result;
use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::source_code_info::Location;
use prost_types::{
    DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
    SourceCodeInfo,
};
use rtwirp::core::generator::{process_request, write_response, SUPPORTED_FEATURES};
use rtwirp::LocalStorage;
use tempfile::TempDir;

fn message(name: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        ..Default::default()
    }
}

fn service(name: &str, methods: Vec<MethodDescriptorProto>) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method: methods,
        ..Default::default()
    }
}

fn proto_file(name: &str, package: &str) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn comment(path: Vec<i32>, text: &str) -> Location {
    Location {
        path,
        leading_comments: Some(text.to_string()),
        ..Default::default()
    }
}

fn haberdasher_file() -> FileDescriptorProto {
    FileDescriptorProto {
        message_type: vec![message("Size"), message("Hat")],
        service: vec![service(
            "Haberdasher",
            vec![method("MakeHat", ".example.Size", ".example.Hat")],
        )],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                comment(vec![6, 0], " A Haberdasher makes hats for clients.\n"),
                comment(
                    vec![6, 0, 2, 0],
                    " MakeHat produces a hat of mysterious, randomly-selected color!\n",
                ),
            ],
        }),
        ..proto_file("example/haberdasher.proto", "example")
    }
}

fn run(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse> {
    Ok(process_request(&request.encode_to_vec())?)
}

/// 產生的程式碼與 tests/fixtures 中實際編譯過的版本一致
#[test]
fn test_haberdasher_matches_fixture() -> Result<()> {
    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        proto_file: vec![haberdasher_file()],
        ..Default::default()
    })?;

    assert_eq!(response.error, None);
    assert_eq!(response.file.len(), 1);
    assert_eq!(response.file[0].name(), "example/haberdasher.pbtwirp.rs");
    assert_eq!(
        response.file[0].content(),
        include_str!("fixtures/haberdasher.pbtwirp.rs")
    );
    Ok(())
}

#[test]
fn test_supports_proto3_optional() -> Result<()> {
    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        proto_file: vec![haberdasher_file()],
        ..Default::default()
    })?;

    assert_eq!(SUPPORTED_FEATURES, 1);
    assert_eq!(response.supported_features, Some(SUPPORTED_FEATURES));
    Ok(())
}

#[test]
fn test_file_without_services_produces_no_output() -> Result<()> {
    let types_only = FileDescriptorProto {
        message_type: vec![message("Money")],
        ..proto_file("common/money.proto", "common")
    };

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["common/money.proto".to_string()],
        proto_file: vec![types_only],
        ..Default::default()
    })?;

    assert_eq!(response.error, None);
    assert!(response.file.is_empty());
    Ok(())
}

/// 同一個 namespace 的多個 import 共用一個 alias，編號依第一次出現的順序
#[test]
fn test_imports_share_alias_per_namespace() -> Result<()> {
    let money = FileDescriptorProto {
        message_type: vec![message("Money")],
        ..proto_file("common/money.proto", "common")
    };
    let currency = FileDescriptorProto {
        message_type: vec![message("Currency")],
        ..proto_file("common/currency.proto", "common")
    };
    let empty = FileDescriptorProto {
        message_type: vec![message("Empty")],
        ..proto_file("google/protobuf/empty.proto", "google.protobuf")
    };
    let shop = FileDescriptorProto {
        dependency: vec![
            "common/money.proto".to_string(),
            "google/protobuf/empty.proto".to_string(),
            "common/currency.proto".to_string(),
        ],
        message_type: vec![message("PriceRequest")],
        service: vec![service(
            "Shop",
            vec![
                method("GetPrice", ".shop.PriceRequest", ".common.Money"),
                method("Ping", ".google.protobuf.Empty", ".google.protobuf.Empty"),
            ],
        )],
        ..proto_file("shop/shop.proto", "shop")
    };

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["shop/shop.proto".to_string()],
        proto_file: vec![money, currency, empty, shop],
        ..Default::default()
    })?;

    assert_eq!(response.error, None);
    let code = response.file[0].content();
    assert!(code.contains(
        "pub mod _1 {\n    pub use super::super::super::common::money::*;\n    pub use super::super::super::common::currency::*;\n}"
    ));
    assert!(code.contains("pub mod _2 {\n    pub use super::super::super::google::protobuf::empty::*;\n}"));
    assert!(!code.contains("pub mod _3"));
    assert!(code.contains(
        "async fn getPrice(&self, ctx: twirp::Context, req: PriceRequest) -> Result<_1::Money, twirp::TwirpError>"
    ));
    assert!(code.contains(
        "async fn ping(&self, ctx: twirp::Context, req: _2::Empty) -> Result<_2::Empty, twirp::TwirpError>"
    ));
    assert!(code.contains("self.client.call(ctx, \"shop.Shop/Ping\", req).await"));
    Ok(())
}

#[test]
fn test_nested_message_uses_module_path() -> Result<()> {
    let mut outer = message("OuterBox");
    outer.nested_type.push(message("Inner"));
    let file = FileDescriptorProto {
        message_type: vec![outer],
        service: vec![service(
            "Boxes",
            vec![method("Open", ".boxes.OuterBox", ".boxes.OuterBox.Inner")],
        )],
        ..proto_file("boxes.proto", "boxes")
    };

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["boxes.proto".to_string()],
        proto_file: vec![file],
        ..Default::default()
    })?;

    let code = response.file[0].content();
    assert_eq!(response.file[0].name(), "boxes.pbtwirp.rs");
    assert!(code.contains("use super::boxes::*;"));
    assert!(code.contains("req: OuterBox) -> Result<outer_box::Inner, twirp::TwirpError>"));
    Ok(())
}

#[test]
fn test_unrelatable_import_fails_whole_request() -> Result<()> {
    let other = FileDescriptorProto {
        message_type: vec![message("Thing")],
        ..proto_file("other.proto", "other")
    };
    let rooted = FileDescriptorProto {
        dependency: vec!["other.proto".to_string()],
        message_type: vec![message("Req")],
        service: vec![service("Svc", vec![method("Do", ".rooted.Req", ".other.Thing")])],
        ..proto_file("/abs/rooted.proto", "rooted")
    };
    let fine = haberdasher_file();

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec![
            "example/haberdasher.proto".to_string(),
            "/abs/rooted.proto".to_string(),
        ],
        proto_file: vec![other, rooted, fine],
        ..Default::default()
    })?;

    assert!(response.file.is_empty());
    assert!(response
        .error()
        .starts_with("error generating relative import path for other.proto"));
    Ok(())
}

#[test]
fn test_streaming_method_is_rejected() -> Result<()> {
    let mut file = haberdasher_file();
    file.service[0].method[0].server_streaming = Some(true);

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        proto_file: vec![file],
        ..Default::default()
    })?;

    assert!(response.file.is_empty());
    assert!(response.error().contains("streaming"));
    Ok(())
}

#[test]
fn test_methods_differing_only_in_case_fail_generation() -> Result<()> {
    let mut file = haberdasher_file();
    file.service[0]
        .method
        .push(method("makeHat", ".example.Size", ".example.Hat"));

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        proto_file: vec![file],
        ..Default::default()
    })?;

    assert!(response.file.is_empty());
    assert_eq!(
        response.error(),
        "Service example.Haberdasher has methods MakeHat and makeHat that both map to makeHat"
    );
    Ok(())
}

#[test]
fn test_runtime_path_parameter() -> Result<()> {
    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        parameter: Some("runtime_path=crate::twirp_runtime".to_string()),
        proto_file: vec![haberdasher_file()],
        ..Default::default()
    })?;

    assert!(response.file[0]
        .content()
        .contains("use crate::twirp_runtime as twirp;"));
    Ok(())
}

#[tokio::test]
async fn test_write_response_to_out_dir() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let out_dir = temp_dir.path().to_str().unwrap().to_string();

    let response = run(CodeGeneratorRequest {
        file_to_generate: vec!["example/haberdasher.proto".to_string()],
        proto_file: vec![haberdasher_file()],
        ..Default::default()
    })?;

    let storage = LocalStorage::new(out_dir);
    let written = write_response(&storage, &response).await?;
    assert_eq!(written, 1);

    let content =
        std::fs::read_to_string(temp_dir.path().join("example/haberdasher.pbtwirp.rs"))?;
    assert!(content.starts_with("// Code generated by protoc-gen-rtwirp. DO NOT EDIT."));
    Ok(())
}
