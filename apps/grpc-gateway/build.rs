//! Build Script for the HubInvestments gRPC Gateway
//!
//! Generates Rust protobuf stubs (servers and clients) from the workspace
//! proto definitions.
//!
//! # Panics Policy
//!
//! Build scripts use `.expect()` and panic on failure: there is no caller to
//! propagate errors to, and the panic message tells the developer which step
//! of code generation failed.
#![allow(clippy::expect_used)]

use prost::Message;
use std::path::PathBuf;

fn main() {
    // Rerun build script if it changes
    println!("cargo:rerun-if-changed=build.rs");

    // Rerun if proto files change
    println!("cargo:rerun-if-changed=../../packages/proto/hub/");

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let proto_root = manifest_dir.join("../../packages/proto");
    let proto_files = [
        "hub/v1/common.proto",
        "hub/v1/auth.proto",
        "hub/v1/order.proto",
        "hub/v1/position.proto",
        "hub/v1/market_data.proto",
        "hub/v1/user.proto",
    ];

    for proto in &proto_files {
        println!("cargo:rerun-if-changed={}", proto_root.join(proto).display());
    }

    // Compile the schemas in-process with protox (no protoc or buf in PATH)
    // and round-trip the descriptor set through its wire encoding so the
    // prost-types version used for codegen is the one pinned here.
    let mut compiler =
        protox::Compiler::new([&proto_root]).expect("Failed to initialise protox compiler");
    compiler.include_imports(true);
    compiler
        .open_files(proto_files)
        .expect("Failed to compile protobuf definitions");
    let descriptor_bytes = compiler.encode_file_descriptor_set();

    let fds = prost_types::FileDescriptorSet::decode(descriptor_bytes.as_slice())
        .expect("Failed to decode descriptor set");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_fds(fds)
        .expect("Failed to generate gRPC code");
}
