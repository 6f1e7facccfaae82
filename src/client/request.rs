use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Part;
use reqwest::Method;
use serde_json::Value;

use super::transport::{PreparedBody, PreparedRequest};
use crate::error::SessionError;

/// What the caller wants to send. The same options are reused verbatim when a
/// request is retried after a refresh; only the access token changes.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            method: Method::GET,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Bytes(bytes.into());
        self
    }

    pub fn form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Turns the options into a request for `url`, attaching `bearer` as the
    /// Authorization header when given.
    ///
    /// Structured bodies are serialized and labelled `application/json`.
    /// Raw bytes keep whatever content type the caller set. Forms drop any
    /// caller content type so the transport can set the multipart boundary.
    pub fn prepare(&self, url: String, bearer: Option<&str>) -> Result<PreparedRequest, SessionError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SessionError::InvalidRequest(format!("invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                SessionError::InvalidRequest(format!("invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }

        let body = match &self.body {
            RequestBody::Empty => PreparedBody::Empty,
            RequestBody::Json(value) => {
                let raw = serde_json::to_vec(value).map_err(|e| {
                    SessionError::InvalidRequest(format!("body is not serializable: {}", e))
                })?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                PreparedBody::Bytes(raw)
            }
            RequestBody::Bytes(raw) => PreparedBody::Bytes(raw.clone()),
            RequestBody::Form(form) => {
                form.check_mime_types()?;
                headers.remove(CONTENT_TYPE);
                PreparedBody::Multipart(form.clone())
            }
        };

        if let Some(token) = bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                SessionError::InvalidRequest("token contains characters not allowed in a header".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(PreparedRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Structured value, sent as JSON text.
    Json(Value),
    /// Raw payload, sent untouched.
    Bytes(Vec<u8>),
    /// Multipart form, sent untouched.
    Form(FormData),
}

/// A multipart form kept as plain data so it can be rebuilt for a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub parts: Vec<FormPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        bytes: Vec<u8>,
        mime: Option<String>,
    },
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                bytes: bytes.into(),
                mime: mime.map(str::to_string),
            },
        });
        self
    }

    fn check_mime_types(&self) -> Result<(), SessionError> {
        for part in &self.parts {
            if let FormValue::File { mime: Some(mime), .. } = &part.value {
                Part::text("").mime_str(mime).map_err(|e| {
                    SessionError::InvalidRequest(format!(
                        "invalid mime type '{}' for form field '{}': {}",
                        mime, part.name, e
                    ))
                })?;
            }
        }
        Ok(())
    }
}
