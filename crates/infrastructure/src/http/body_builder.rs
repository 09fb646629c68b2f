//! HTTP request body builder.
//!
//! Turns a resolved [`HttpBody`] into something reqwest can send. File
//! paths of binary bodies and file form fields are read here, relative to an
//! optional base directory.

use std::path::{Path, PathBuf};

use courier_application::DispatchError;
use courier_domain::{FormField, FormFieldKind, HttpBody};
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// Failed to read a referenced file.
    #[error("failed to read {path}: {message}")]
    FileRead {
        /// Path as resolved
        path: String,
        /// I/O error text
        message: String,
    },

    /// Invalid body configuration.
    #[error("invalid body configuration: {message}")]
    InvalidConfig {
        /// What is wrong
        message: String,
    },

    /// Form encoding failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// Encoder error text
        message: String,
    },
}

impl From<BodyBuildError> for DispatchError {
    fn from(err: BodyBuildError) -> Self {
        Self::RequestBody(err.to_string())
    }
}

/// Result of building a body.
#[derive(Debug)]
pub enum BuiltBody {
    /// No body.
    None,
    /// Text body with its content type.
    Text {
        /// Body text
        content: String,
        /// Content type implied by the body kind
        content_type: &'static str,
    },
    /// File contents.
    Binary {
        /// Raw bytes
        content: Vec<u8>,
        /// Content type implied by the body kind
        content_type: &'static str,
    },
    /// Multipart form data.
    Multipart(Form),
}

impl BuiltBody {
    /// Content type to send when no header sets one.
    ///
    /// Multipart returns `None`; reqwest sets it with the boundary.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Text { content_type, .. } | Self::Binary { content_type, .. } => {
                Some(content_type)
            }
            Self::None | Self::Multipart(_) => None,
        }
    }

    /// Attaches the body to `builder`.
    #[must_use]
    pub fn attach(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Text { content, .. } => builder.body(content),
            Self::Binary { content, .. } => builder.body(content),
            Self::Multipart(form) => builder.multipart(form),
        }
    }
}

/// Builds the wire body of `body`.
///
/// Empty text bodies, empty binary paths and forms without enabled fields
/// produce [`BuiltBody::None`].
///
/// # Errors
///
/// Returns an error if a referenced file cannot be read or the form cannot
/// be encoded.
pub async fn build_body(
    body: &HttpBody,
    base_dir: Option<&Path>,
) -> Result<BuiltBody, BodyBuildError> {
    let content_type = body.content_type().unwrap_or("application/octet-stream");
    match body {
        HttpBody::None => Ok(BuiltBody::None),

        HttpBody::Json { data } | HttpBody::Xml { data } | HttpBody::Text { data } => {
            if data.is_empty() {
                return Ok(BuiltBody::None);
            }
            Ok(BuiltBody::Text {
                content: data.clone(),
                content_type,
            })
        }

        HttpBody::UrlEncoded { fields } => {
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .filter(|f| f.enabled)
                .map(|f| (f.key.as_str(), f.value.as_str()))
                .collect();
            if pairs.is_empty() {
                return Ok(BuiltBody::None);
            }
            let content = serde_urlencoded::to_string(&pairs).map_err(|e| {
                BodyBuildError::Serialization {
                    message: e.to_string(),
                }
            })?;
            Ok(BuiltBody::Text {
                content,
                content_type,
            })
        }

        HttpBody::FormData { fields } => {
            if !fields.iter().any(|f| f.enabled) {
                return Ok(BuiltBody::None);
            }
            let form = build_multipart_form(fields, base_dir).await?;
            Ok(BuiltBody::Multipart(form))
        }

        HttpBody::Binary { path } => {
            if path.is_empty() {
                return Ok(BuiltBody::None);
            }
            let content = read_file(&resolve_path(path, base_dir)).await?;
            Ok(BuiltBody::Binary {
                content,
                content_type,
            })
        }
    }
}

async fn build_multipart_form(
    fields: &[FormField],
    base_dir: Option<&Path>,
) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for field in fields.iter().filter(|f| f.enabled) {
        match field.kind {
            FormFieldKind::Text => {
                form = form.text(field.key.clone(), field.value.clone());
            }
            FormFieldKind::File => {
                let file_path = resolve_path(&field.value, base_dir);
                let content = read_file(&file_path).await?;

                let filename = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("file")
                    .to_string();
                let mime_type = mime_guess::from_path(&file_path)
                    .first_or_octet_stream()
                    .to_string();

                let part = Part::bytes(content)
                    .file_name(filename)
                    .mime_str(&mime_type)
                    .map_err(|e| BodyBuildError::InvalidConfig {
                        message: format!("invalid MIME type: {e}"),
                    })?;

                form = form.part(field.key.clone(), part);
            }
        }
    }

    Ok(form)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, BodyBuildError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| BodyBuildError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn resolve_path(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    match base_dir {
        Some(base) if !path.is_absolute() => base.join(path),
        _ => path.to_path_buf(),
    }
}
