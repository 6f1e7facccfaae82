use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::debug;

use super::request::{FormData, FormValue};
use super::response::ApiResponse;
use crate::config::TransportConfig;
use crate::error::TransportError;

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

#[derive(Debug, Clone)]
pub enum PreparedBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(FormData),
}

/// Performs HTTP round-trips for the session. Any status code is a
/// successful round-trip; only transport failures are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError>;
}

/// The default transport: a reqwest client with a cookie jar, so cookies set
/// by the API (including a cookie-based refresh credential) go out with
/// every later call.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

fn multipart_form(url: &str, form: FormData) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for part in form.parts {
        multipart = match part.value {
            FormValue::Text(text) => multipart.text(part.name, text),
            FormValue::File {
                file_name,
                bytes,
                mime,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file.mime_str(&mime).map_err(|source| TransportError::Http {
                        url: url.to_string(),
                        source,
                    })?;
                }
                multipart.part(part.name, file)
            }
        };
    }
    Ok(multipart)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        builder = match request.body {
            PreparedBody::Empty => builder,
            PreparedBody::Bytes(bytes) => builder.body(bytes),
            PreparedBody::Multipart(form) => builder.multipart(multipart_form(&request.url, form)?),
        };

        let response = builder.send().await.map_err(|source| TransportError::Http {
            url: request.url.clone(),
            source,
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                url: request.url.clone(),
                source,
            })?
            .to_vec();

        debug!("{} answered with status {}", request.url, status);
        Ok(ApiResponse::new(status, headers, body))
    }
}
