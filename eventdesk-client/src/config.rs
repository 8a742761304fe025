//! Deployment configuration of the data provider.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// How filters, sorters and pagination of a list query are put into the query string.
///
/// The backend only understands one of these, so this is fixed per deployment.
pub enum FilterEncoding {
    /// `page`, `limit`, `field=value` / `field_<operator>=value` and `sort=field:order,...`
    Flat,
    /// `current`, `pageSize`, `filters[i][field|operator|value]` and `sorters[i][field|order]`
    #[default]
    Indexed,
}

serde_plain::derive_display_from_serialize!(FilterEncoding);
serde_plain::derive_fromstr_from_deserialize!(FilterEncoding);

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
/// HTTP method used for regular record updates.
pub enum UpdateMethod {
    #[default]
    Patch,
    Put,
}

impl UpdateMethod {
    pub fn method(self) -> http::Method {
        match self {
            UpdateMethod::Patch => http::Method::PATCH,
            UpdateMethod::Put => http::Method::PUT,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Data provider settings, usually read from a JSON file shipped with the deployment.
///
/// ```json
/// {
///     "api-url": "https://api.example.com",
///     "filter-encoding": "flat",
///     "update-method": "PUT",
///     "timeout-secs": 10
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DataProviderConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    #[serde(default)]
    pub filter_encoding: FilterEncoding,
    #[serde(default)]
    pub update_method: UpdateMethod,
    /// `User-Agent` header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Overall timeout of a single request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DataProviderConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            filter_encoding: FilterEncoding::default(),
            update_method: UpdateMethod::default(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Parse a configuration from its JSON representation and validate it.
    pub fn from_json(data: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(data)
            .map_err(|err| Error::Config(format!("failed to parse configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            Error::Config(format!("unable to read '{}': {err}", path.display()))
        })?;
        Self::from_json(&data)
    }

    /// Check that the API url is an absolute http(s) URI.
    pub fn validate(&self) -> Result<(), Error> {
        let uri: http::Uri = self
            .api_url
            .parse()
            .map_err(|err| Error::Config(format!("invalid api-url '{}': {err}", self.api_url)))?;

        match uri.scheme_str() {
            Some("http") | Some("https") => (),
            _ => {
                return Err(Error::Config(format!(
                    "api-url '{}' must be an http or https url",
                    self.api_url
                )))
            }
        }

        if uri.authority().is_none() {
            return Err(Error::Config(format!(
                "api-url '{}' has no host",
                self.api_url
            )));
        }

        Ok(())
    }

    /// The API url without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
