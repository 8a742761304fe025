use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request};
use serde::Serialize;

use crate::{DataProviderConfig, Error, HttpApiClient, HttpApiResponse};

/// Response bodies larger than this are rejected unless [`ClientOptions`] says otherwise.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpApiResponse, Error>> + Send + 'a>>;

/// Options for the HTTP transport.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// `User-Agent` header value
    pub user_agent: Option<String>,
    /// Overall timeout of a request, `None` waits forever.
    pub timeout: Option<Duration>,
    /// Largest response body accepted, [`DEFAULT_MAX_BODY_SIZE`] if `None`.
    pub max_body_size: Option<u64>,
}

impl From<&DataProviderConfig> for ClientOptions {
    fn from(config: &DataProviderConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_body_size: None,
        }
    }
}

/// An API client backed by a blocking [`ureq::Agent`].
///
/// Every request runs on tokio's blocking thread pool, so the returned futures must be polled
/// from within a tokio runtime.
pub struct Client {
    api_url: String,
    agent: ureq::Agent,
    max_body_size: u64,
}

impl Client {
    /// Create a new client instance which will connect to the provided endpoint.
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::with_options(api_url, ClientOptions::default())
    }

    /// Create a client for the API url and transport settings of a deployment.
    pub fn from_config(config: &DataProviderConfig) -> Result<Self, Error> {
        config.validate()?;
        Self::with_options(config.base_url(), ClientOptions::from(config))
    }

    pub fn with_options(api_url: &str, options: ClientOptions) -> Result<Self, Error> {
        let uri: http::Uri = api_url
            .parse()
            .map_err(|err| Error::Config(format!("invalid api url '{api_url}': {err}")))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::Config(format!("api url '{api_url}' is not absolute")));
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            agent: Self::agent(&options),
            max_body_size: options.max_body_size.unwrap_or(DEFAULT_MAX_BODY_SIZE),
        })
    }

    /// Get the currently used API url.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn agent(options: &ClientOptions) -> ureq::Agent {
        ureq::Agent::config_builder()
            .tls_config(
                ureq::tls::TlsConfig::builder()
                    .provider(ureq::tls::TlsProvider::NativeTls)
                    .root_certs(ureq::tls::RootCerts::PlatformVerifier)
                    .build(),
            )
            .user_agent(options.user_agent.as_deref().unwrap_or(concat!(
                "eventdesk-client/",
                env!("CARGO_PKG_VERSION")
            )))
            .timeout_global(options.timeout)
            .http_status_as_error(false)
            .build()
            .into()
    }

    /// Build a request relative to the current API endpoint.
    fn build_request<T>(
        &self,
        method: Method,
        path_and_query: &str,
        params: Option<T>,
    ) -> Result<Request<Option<String>>, Error>
    where
        T: Serialize,
    {
        let uri = format!("{}{}", self.api_url, path_and_query);
        let body = params
            .map(|params| serde_json::to_string(&params))
            .transpose()
            .map_err(|err| Error::internal("failed to serialize parameters", err))?;

        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .map_err(|err| Error::internal("failed to build request", err))
    }
}

fn run_request(
    agent: ureq::Agent,
    request: Request<Option<String>>,
    max_body_size: u64,
) -> Result<HttpApiResponse, Error> {
    let (parts, body) = request.into_parts();

    let response = match body {
        Some(body) => agent.run(Request::from_parts(parts, body)),
        None => agent.run(Request::from_parts(parts, ureq::SendBody::none())),
    }
    .map_err(Error::unreachable)?;

    let (parts, mut body) = response.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = body
        .with_config()
        .limit(max_body_size)
        .read_to_vec()
        .map_err(body_error)?;

    Ok(HttpApiResponse {
        status: parts.status.as_u16(),
        content_type,
        body,
    })
}

/// An oversized body is reported as unexpected data, not as a transport failure.
fn body_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::BodyExceedsLimit(limit) => {
            Error::BadApi(format!("response body exceeds {limit} bytes"), None)
        }
        err => Error::unreachable(err),
    }
}

impl HttpApiClient for Client {
    type ResponseFuture<'a>
        = ResponseFuture<'a>
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
        let request = self.build_request(method, path_and_query, params);
        let agent = self.agent.clone();
        let max_body_size = self.max_body_size;

        Box::pin(async move {
            let request = request?;
            tokio::task::spawn_blocking(move || run_request(agent, request, max_body_size))
                .await
                .map_err(|err| Error::internal("request task failed", err))?
        })
    }
}
