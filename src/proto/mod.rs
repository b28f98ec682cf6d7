//! Generated protobuf code for the remote registry service.
//!
//! Source: `proto/cmdhub/registry.proto`. The generated files are checked in
//! so builds do not need `protoc`; regenerate them with tonic-build 0.12
//! after editing the proto.

include!("cmdhub.registry.rs");
include!("cmdhub.registry.tonic.rs");
