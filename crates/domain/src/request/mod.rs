//! Request types
//!
//! A stored request pairs identity and hooks with one protocol-specific spec.

mod graphql;
mod grpc;
mod http;
mod spec;

pub use graphql::GraphQlRequestSpec;
pub use grpc::GrpcRequestSpec;
pub use http::{FormField, FormFieldKind, HttpBody, HttpMethod, HttpRequestSpec};
pub use spec::{ProtocolSpec, Request, RequestKind};
