//! Protocol senders
//!
//! Each sender resolves its request through the shared `SendContext` and
//! performs exactly one attempt on the wire.

mod graphql;
mod grpc;
mod http;
mod transport;

pub use graphql::GraphQlSender;
pub use grpc::GrpcSender;
pub use http::HttpSender;
pub use transport::AGENT_NAME;
