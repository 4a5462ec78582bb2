//! The HTTP seam.
//!
//! Everything that talks to the network goes through [`Transport`], so the
//! handshake and the service client can run against any HTTP stack. The
//! default implementation drives a `reqwest::Client`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use reqwest::multipart;
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// A file uploaded as one part of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new<TField, TName>(field_name: TField, file_name: TName, bytes: Vec<u8>) -> Self
    where
        TField: Into<String>,
        TName: Into<String>,
    {
        FileAttachment {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn content_type<T: Into<String>>(self, content_type: T) -> Self {
        FileAttachment {
            content_type: Some(content_type.into()),
            ..self
        }
    }
}

impl fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAttachment")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// `multipart/form-data`: text fields followed by the file part.
    Multipart {
        fields: Vec<(String, String)>,
        file: FileAttachment,
    },
}

/// A fully signed request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request. Non-2xx answers are returned as responses;
    /// only network-level failures become `Error::Transport`.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<T> Transport for std::sync::Arc<T>
where
    T: Transport + ?Sized,
{
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).execute(request).await
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Constructs a new `ReqwestTransport`.
    ///
    /// This method calls reqwest::Client::new() internally.
    pub fn new() -> Self {
        ReqwestTransport {
            inner: reqwest::Client::new(),
        }
    }

    /// Constructs a new `ReqwestTransport` with specifying inner `reqwest::Client`.
    pub fn new_with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { inner: client }
    }

    pub fn with_timeout(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        Ok(ReqwestTransport {
            inner: builder.build()?,
        })
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        ReqwestTransport::new_with_client(client)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;
        debug!(%method, url = %url, "sending request");

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart { fields, file } => {
                let mut part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
                if let Some(content_type) = file.content_type {
                    part = part.mime_str(&content_type)?;
                }
                let form = fields
                    .into_iter()
                    .fold(multipart::Form::new(), |form, (k, v)| form.text(k, v))
                    .part(file.field_name, part);
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(Error::from)?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, "received response");
        Ok(TransportResponse { status, body })
    }
}
