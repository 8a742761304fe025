use std::borrow::Cow;
use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters kept verbatim in a record id path segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Builder for API paths with a query.
///
/// The [`arg`](Self::arg) method can be used to add multiple arguments to the query.
///
/// ```rust
/// use eventdesk_client::ApiPathBuilder;
///
/// let query = ApiPathBuilder::new("/events")
///     .arg("page", 2)
///     .arg("name", "Congreso 2024")
///     .build();
///
/// assert_eq!(&query, "/events?page=2&name=Congreso%202024");
/// ```
#[derive(Clone, Debug)]
pub struct ApiPathBuilder {
    url: String,
    separator: char,
}

impl ApiPathBuilder {
    /// Creates a new builder from a base path.
    pub fn new<'a>(base: impl Into<Cow<'a, str>>) -> Self {
        Self {
            url: base.into().into_owned(),
            separator: '?',
        }
    }

    /// Creates a builder for `/{resource}`, or `/{resource}/{id}` if an id is given.
    ///
    /// The resource may span several path segments (`notifications/send-from-template`) and is
    /// used as is, the id is percent-encoded.
    pub fn resource(resource: &str, id: Option<&str>) -> Self {
        let resource = resource.trim_matches('/');
        match id {
            Some(id) => Self::new(format!("/{resource}/{}", encode_id(id))),
            None => Self::new(format!("/{resource}")),
        }
    }

    /// Adds an argument to the query.
    ///
    /// The name and value will be percent-encoded.
    pub fn arg<T: Display>(mut self, name: &str, value: T) -> Self {
        self.push_separator_and_name(name);
        self.push_encoded(value.to_string().as_bytes());
        self
    }

    /// Adds the same argument once for every value, e.g. `id=1&id=2`.
    pub fn repeated_arg<I, T>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        for value in values {
            self = self.arg(name, value);
        }
        self
    }

    /// Builds the url.
    pub fn build(self) -> String {
        self.url
    }

    fn push_separator_and_name(&mut self, name: &str) {
        self.url.push(self.separator);
        self.separator = '&';
        self.push_encoded(name.as_bytes());
        self.url.push('=');
    }

    fn push_encoded(&mut self, value: &[u8]) {
        let enc_value = percent_encoding::percent_encode(value, NON_ALPHANUMERIC);
        self.url.extend(enc_value);
    }
}

fn encode_id(id: &str) -> String {
    utf8_percent_encode(id, ID_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_paths() {
        assert_eq!(ApiPathBuilder::resource("events", None).build(), "/events");
        assert_eq!(
            ApiPathBuilder::resource("events", Some("66f1e0b57c2e2fbdefa21271")).build(),
            "/events/66f1e0b57c2e2fbdefa21271"
        );
        assert_eq!(
            ApiPathBuilder::resource("/notifications/send-from-template/", Some("a b")).build(),
            "/notifications/send-from-template/a%20b"
        );
    }

    #[test]
    fn query_arguments() {
        let path = ApiPathBuilder::resource("posters", None)
            .arg("filters[0][field]", "title")
            .arg("page", 3)
            .repeated_arg("id", ["a", "b"])
            .build();

        assert_eq!(
            path,
            "/posters?filters%5B0%5D%5Bfield%5D=title&page=3&id=a&id=b"
        );
    }
}
