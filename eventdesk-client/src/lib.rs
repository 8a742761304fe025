#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Data provider adapter for the EventDesk admin REST API.
//!
//! The [`DataProvider`] offers the uniform CRUD contract the admin screens are written against
//! and translates it into the backend's query conventions and response envelopes. Requests go
//! through an [`HttpApiClient`], of which [`Client`] is the default implementation.

use std::future::Future;

use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

mod error;
pub use error::Error;

mod api_path_builder;
pub use api_path_builder::ApiPathBuilder;

mod client;
pub use client::{Client, ClientOptions, DEFAULT_MAX_BODY_SIZE};

pub mod config;
pub use config::{DataProviderConfig, FilterEncoding, UpdateMethod};

pub mod envelope;

pub mod query;

pub mod registry;
pub use registry::{ResourceKind, ResourceRegistry, TriggerAction};

mod provider;
pub use provider::DataProvider;

pub use eventdesk_api_types as types;

/// HTTP client backend trait. This should be implemented for a HTTP client capable of making
/// requests against the API url it was set up with.
///
/// Implementations return `Ok` for every response the server sent, whatever its status. `Err`
/// means no response was obtained at all.
pub trait HttpApiClient {
    /// An API call should return a status code and the raw body.
    type ResponseFuture<'a>: Future<Output = Result<HttpApiResponse, Error>> + 'a
    where
        Self: 'a;

    /// An asynchronous request with a path and query component (no hostname), and an optional
    /// JSON body, of which the response body is read to completion.
    fn request<'a, T>(
        &'a self,
        method: Method,
        path_and_query: &'a str,
        params: Option<T>,
    ) -> Self::ResponseFuture<'a>
    where
        T: Serialize + 'a;
}

/// A response from the HTTP API as required by the [`HttpApiClient`] trait.
#[derive(Clone, Debug)]
pub struct HttpApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpApiResponse {
    /// A `200 OK` response carrying `body` as JSON.
    pub fn json_ok(body: &Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The canonical reason phrase of the status, or the bare code for unknown ones.
    pub fn status_text(&self) -> String {
        match self.status_code().canonical_reason() {
            Some(reason) if self.status_code().as_u16() == self.status => reason.to_string(),
            _ => self.status.to_string(),
        }
    }

    /// The body as text, for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON. An empty body is `null`.
    pub fn json(&self) -> Result<Value, Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        self.assert_json_content_type()?;

        serde_json::from_slice(&self.body)
            .map_err(|err| Error::bad_api("failed to parse api response", err))
    }

    fn assert_json_content_type(&self) -> Result<(), Error> {
        match self
            .content_type
            .as_deref()
            .and_then(|v| v.split(';').next())
            .map(str::trim)
        {
            Some("application/json") | None => Ok(()),
            Some(other) => Err(Error::BadApi(
                format!("expected json body, got {other}"),
                None,
            )),
        }
    }
}

impl<C> HttpApiClient for &C
where
    C: HttpApiClient,
{
    type ResponseFuture<'a>
        = C::ResponseFuture<'a>
    where
        Self: 'a;

    fn request<'a, T>(
        &'a self,
        method: Method,
        path_and_query: &'a str,
        params: Option<T>,
    ) -> Self::ResponseFuture<'a>
    where
        T: Serialize + 'a,
    {
        C::request(self, method, path_and_query, params)
    }
}

impl<C> HttpApiClient for std::sync::Arc<C>
where
    C: HttpApiClient,
{
    type ResponseFuture<'a>
        = C::ResponseFuture<'a>
    where
        Self: 'a;

    fn request<'a, T>(
        &'a self,
        method: Method,
        path_and_query: &'a str,
        params: Option<T>,
    ) -> Self::ResponseFuture<'a>
    where
        T: Serialize + 'a,
    {
        C::request(self, method, path_and_query, params)
    }
}
