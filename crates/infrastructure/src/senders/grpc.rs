//! gRPC sender over a schema compiled at send time
//!
//! The inline `.proto` is compiled with protox, the JSON message is encoded
//! through prost-reflect and the call goes out on a tonic channel as raw
//! bytes. A non-OK status is reported in the response, not as an error.

use std::time::Instant;

use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes};
use courier_application::{DispatchError, DispatchResult, RequestSender, SendContext};
use courier_domain::{GrpcRequestSpec, KeyValue, ProtocolSpec, Response, generate_id};
use http::uri::PathAndQuery;
use prost::Message as _;
use prost_reflect::{DescriptorPool, DynamicMessage, MethodDescriptor};
use tonic::client::Grpc;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::metadata::{KeyAndValueRef, MetadataKey, MetadataMap, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, warn};

use crate::auth::auth_header;

/// Passes messages through undecoded, holding replies to `limit` bytes.
struct RawBytesCodec {
    limit: Option<usize>,
}

impl Codec for RawBytesCodec {
    type Encode = Bytes;
    type Decode = Frame;
    type Encoder = RawBytesEncoder;
    type Decoder = RawBytesDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        RawBytesEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        RawBytesDecoder { limit: self.limit }
    }
}

/// One decoded reply message.
enum Frame {
    Message(Bytes),
    Oversized { len: usize, limit: usize },
}

struct RawBytesEncoder;

impl Encoder for RawBytesEncoder {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

struct RawBytesDecoder {
    limit: Option<usize>,
}

impl Decoder for RawBytesDecoder {
    type Item = Frame;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let len = src.remaining();
        if let Some(limit) = self.limit
            && len > limit
        {
            src.advance(len);
            return Ok(Some(Frame::Oversized { len, limit }));
        }
        Ok(Some(Frame::Message(src.copy_to_bytes(len))))
    }
}

/// Compiles an inline schema into a descriptor pool.
///
/// protox resolves files from disk, so the schema is written to a scratch
/// directory that is removed afterwards.
fn compile_proto(proto: &str) -> DispatchResult<DescriptorPool> {
    let invalid = |what: &str, e: &dyn std::fmt::Display| {
        DispatchError::InvalidRequest(format!("{what}: {e}"))
    };

    let temp_dir = std::env::temp_dir().join(format!("courier-proto-{}", generate_id()));
    std::fs::create_dir_all(&temp_dir).map_err(|e| invalid("failed to create temp directory", &e))?;
    let compiled = std::fs::write(temp_dir.join("service.proto"), proto)
        .map_err(|e| invalid("failed to write proto file", &e))
        .and_then(|()| {
            protox::compile(["service.proto"], [&temp_dir])
                .map_err(|e| invalid("failed to compile proto", &e))
        });
    if let Err(e) = std::fs::remove_dir_all(&temp_dir) {
        debug!(dir = %temp_dir.display(), error = %e, "could not remove proto scratch dir");
    }

    DescriptorPool::decode(compiled?.encode_to_vec().as_ref())
        .map_err(|e| invalid("failed to build descriptor pool", &e))
}

fn find_method(pool: &DescriptorPool, spec: &GrpcRequestSpec) -> DispatchResult<MethodDescriptor> {
    let service = pool.get_service_by_name(spec.service.trim()).ok_or_else(|| {
        DispatchError::InvalidRequest(format!("service {} not found in schema", spec.service))
    })?;
    service
        .methods()
        .find(|m| m.name() == spec.method.trim())
        .ok_or_else(|| {
            DispatchError::InvalidRequest(format!(
                "method {} not found in service {}",
                spec.method, spec.service
            ))
        })
}

fn encode_message(method: &MethodDescriptor, spec: &GrpcRequestSpec) -> DispatchResult<Bytes> {
    let message = DynamicMessage::deserialize(method.input(), spec.message()?)
        .map_err(|e| DispatchError::RequestBody(format!("failed to encode request message: {e}")))?;
    Ok(Bytes::from(message.encode_to_vec()))
}

fn decode_message(method: &MethodDescriptor, bytes: &[u8]) -> DispatchResult<Vec<u8>> {
    let message = DynamicMessage::decode(method.output(), bytes)
        .map_err(|e| DispatchError::BodyRead(format!("failed to decode response: {e}")))?;
    serde_json::to_vec(&message).map_err(|e| DispatchError::BodyRead(e.to_string()))
}

/// Builds the request metadata from enabled entries and the auth header.
///
/// Entries that are not valid ASCII metadata are skipped.
fn request_metadata(spec: &GrpcRequestSpec) -> MetadataMap {
    let mut map = MetadataMap::new();
    let auth = auth_header(&spec.auth);
    let entries = spec
        .metadata
        .iter()
        .filter(|kv| kv.enabled && !kv.key.trim().is_empty())
        .map(|kv| (kv.key.as_str(), kv.value.as_str()))
        .chain(auth.as_ref().map(|(k, v)| (k.as_str(), v.as_str())));

    for (key, value) in entries {
        let key = key.trim().to_ascii_lowercase();
        match (
            MetadataKey::from_bytes(key.as_bytes()),
            MetadataValue::try_from(value),
        ) {
            (Ok(name), Ok(val)) => {
                map.append(name, val);
            }
            _ => warn!(key = %key, "skipping invalid gRPC metadata entry"),
        }
    }
    map
}

fn metadata_pairs(map: &MetadataMap) -> Vec<KeyValue> {
    map.iter()
        .filter_map(|kv| match kv {
            KeyAndValueRef::Ascii(key, value) => {
                Some(KeyValue::new(key.as_str(), value.to_str().unwrap_or_default()))
            }
            KeyAndValueRef::Binary(..) => None,
        })
        .collect()
}

/// Canonical upper-case name of a status code.
const fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
        _ => "UNKNOWN",
    }
}

fn code_number(code: Code) -> u16 {
    u16::try_from(i32::from(code)).unwrap_or(u16::MAX)
}

fn endpoint_uri(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

struct Reply {
    headers: MetadataMap,
    message: Option<Frame>,
    trailers: MetadataMap,
}

async fn call(
    grpc: &mut Grpc<Channel>,
    request: tonic::Request<Bytes>,
    path: PathAndQuery,
    limit: Option<usize>,
) -> Result<Reply, Status> {
    let response = grpc
        .server_streaming(request, path, RawBytesCodec { limit })
        .await?;
    let headers = response.metadata().clone();
    let mut stream = response.into_inner();
    let message = stream.message().await?;
    let trailers = stream.trailers().await?.unwrap_or_default();
    Ok(Reply {
        headers,
        message,
        trailers,
    })
}

/// Sends unary gRPC calls described by an inline schema.
#[derive(Clone)]
pub struct GrpcSender {
    context: SendContext,
}

impl GrpcSender {
    /// Creates a sender resolving requests through `context`.
    #[must_use]
    pub const fn new(context: SendContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestSender for GrpcSender {
    async fn send_request(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response> {
        let prepared = self.context.prepare(request_id, environment_id)?;
        let ProtocolSpec::Grpc(spec) = prepared.request.spec else {
            return Err(DispatchError::InvalidRequest(format!(
                "request {request_id} is not a gRPC request"
            )));
        };
        if spec.proto.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(format!(
                "gRPC request {request_id} has no proto schema"
            )));
        }

        let proto = spec.proto.clone();
        let pool = tokio::task::spawn_blocking(move || compile_proto(&proto))
            .await
            .map_err(|e| DispatchError::InvalidRequest(e.to_string()))??;
        let method = find_method(&pool, &spec)?;
        let payload = encode_message(&method, &spec)?;
        let path: PathAndQuery = format!("/{}/{}", method.parent_service().full_name(), method.name())
            .parse()
            .map_err(|e| DispatchError::InvalidRequest(format!("invalid gRPC path: {e}")))?;

        let preferences = self.context.preferences();
        let mut endpoint = Endpoint::from_shared(endpoint_uri(&spec.address))
            .map_err(|e| DispatchError::InvalidRequest(format!("invalid address {:?}: {e}", spec.address)))?;
        if let Some(timeout) = preferences.timeout() {
            endpoint = endpoint.timeout(timeout).connect_timeout(timeout);
        }

        let metadata = request_metadata(&spec);
        let sent_metadata = metadata_pairs(&metadata);
        let mut request = tonic::Request::new(payload);
        *request.metadata_mut() = metadata;

        debug!(address = %spec.address, path = %path, "sending gRPC call");
        let start = Instant::now();
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| DispatchError::Transport(format!("failed to connect: {e}")))?;
        // The size preference is enforced by the decoder, not tonic's default cap.
        let limit = preferences
            .max_response_bytes()
            .map(|bytes| usize::try_from(bytes).unwrap_or(usize::MAX));
        let mut grpc = Grpc::new(channel).max_decoding_message_size(usize::MAX);
        grpc.ready()
            .await
            .map_err(|e| DispatchError::Transport(format!("service not ready: {e}")))?;
        let outcome = call(&mut grpc, request, path, limit).await;
        let elapsed = start.elapsed();

        let mut response = match outcome {
            Ok(reply) => {
                let body = match &reply.message {
                    Some(Frame::Message(bytes)) => decode_message(&method, bytes)?,
                    Some(Frame::Oversized { len, limit }) => {
                        return Err(DispatchError::BodyRead(format!(
                            "response message of {len} bytes exceeds the {limit} byte limit"
                        )));
                    }
                    None => Vec::new(),
                };
                let mut response = Response::new(code_number(Code::Ok), body, elapsed)
                    .with_status(code_name(Code::Ok));
                response.response_metadata = metadata_pairs(&reply.headers);
                response.trailers = metadata_pairs(&reply.trailers);
                response
            }
            Err(status) => {
                debug!(code = ?status.code(), message = status.message(), "gRPC call returned an error status");
                let mut response = Response::new(code_number(status.code()), Vec::new(), elapsed)
                    .with_status(code_name(status.code()));
                response.trailers = metadata_pairs(status.metadata());
                response.error = Some(status.message().to_string());
                response
            }
        };
        response.request_metadata = sent_metadata;
        Ok(response)
    }
}
