use std::error::Error as StdError;
use std::fmt::{self, Display};

use http::StatusCode;

/// Errors returned by the data provider and its transports.
#[derive(Debug)]
pub enum Error {
    /// The request could not be completed: the backend was unreachable (`None` status) or
    /// answered with a non-success status.
    RequestFailed(Option<StatusCode>, String),

    /// The backend answered `404` for the given path.
    NotFound(String),

    /// A trigger action was rejected. Carries the status text of the response.
    SendFailed(String),

    /// The backend answered with something that is not a JSON document.
    BadApi(String, Option<Box<dyn StdError + Send + Sync + 'static>>),

    /// The configuration is unusable.
    Config(String),

    /// The resource identifier passed to an operation is not a usable path.
    InvalidResource(String),

    /// The record id passed to an operation is empty or blank.
    InvalidId(String),

    /// Failed to build a request or to drive the transport.
    Internal(&'static str, Box<dyn StdError + Send + Sync + 'static>),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::BadApi(_, Some(err)) => Some(&**err),
            Self::Internal(_, err) => Some(&**err),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::RequestFailed(Some(status), msg) => {
                write!(f, "request failed (status = {status}): {msg}")
            }
            Self::RequestFailed(None, msg) => write!(f, "request failed: {msg}"),
            Self::NotFound(path) => write!(f, "resource not found: {path}"),
            Self::SendFailed(status_text) => write!(f, "trigger action failed: {status_text}"),
            Self::BadApi(msg, None) => write!(f, "api returned unexpected data: {msg}"),
            Self::BadApi(msg, Some(err)) => write!(f, "api returned unexpected data: {msg}: {err}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InvalidResource(resource) => write!(f, "invalid resource '{resource}'"),
            Self::InvalidId(id) => write!(f, "invalid record id '{id}'"),
            Self::Internal(msg, err) => write!(f, "{msg}: {err}"),
        }
    }
}

impl Error {
    pub(crate) fn request_failed(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::RequestFailed(Some(status), msg.into())
    }

    pub(crate) fn unreachable(err: impl Display) -> Self {
        Self::RequestFailed(None, err.to_string())
    }

    pub(crate) fn bad_api<E>(msg: impl Into<String>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::BadApi(msg.into(), Some(Box::new(err)))
    }

    pub(crate) fn internal<E>(context: &'static str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Internal(context, Box::new(err))
    }

    /// The HTTP status of a failed request, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed(status, _) => *status,
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}
