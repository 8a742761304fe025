use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Locale;

/// Image CDNs whose URLs are shown as images even without a file extension.
pub const DEFAULT_IMAGE_HOSTS: &[&str] = &[
    "imagekit.io",
    "cloudinary.com",
    "imgur.com",
    "firebasestorage.googleapis.com",
];

/// Strings longer than this many characters are rendered as markdown.
pub const DEFAULT_MARKDOWN_THRESHOLD: usize = 200;

/// Backend revision marker, never shown.
const REVISION_FIELD: &str = "__v";

/// Settings for [`render_record`](crate::render_record).
///
/// ```
/// # use eventdesk_renderer::{Locale, RenderOptions};
/// let options: RenderOptions = serde_json::from_str(r#"{
///     "field-order": ["name", "startDate"],
///     "field-labels": { "startDate": "Fecha de inicio" },
///     "locale": "es"
/// }"#).unwrap();
///
/// assert_eq!(options.exclude_fields, ["__v"]);
/// assert_eq!(options.locale, Locale::Es);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RenderOptions {
    /// Fields never rendered.
    pub exclude_fields: Vec<String>,
    /// Explicit labels by field name.
    pub field_labels: HashMap<String, String>,
    /// Fields rendered first, in this order.
    pub field_order: Vec<String>,
    pub locale: Locale,
    /// Hosts serving images without file extensions in their URLs.
    pub image_hosts: Vec<String>,
    pub markdown_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            exclude_fields: vec![REVISION_FIELD.to_string()],
            field_labels: HashMap::new(),
            field_order: Vec::new(),
            locale: Locale::default(),
            image_hosts: DEFAULT_IMAGE_HOSTS.iter().map(|h| h.to_string()).collect(),
            markdown_threshold: DEFAULT_MARKDOWN_THRESHOLD,
        }
    }
}

impl RenderOptions {
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Never render `field`.
    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.exclude_fields.push(field.into());
        self
    }

    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.field_labels.insert(field.into(), label.into());
        self
    }

    /// Render these fields first.
    pub fn order<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_excluded(&self, field: &str) -> bool {
        self.exclude_fields.iter().any(|f| f == field)
    }
}
