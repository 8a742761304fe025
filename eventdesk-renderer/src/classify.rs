//! Pure classification of record values. Rendering dispatches on the kinds defined here.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Shape of a single record value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    /// Array of strings, numbers and booleans only. The empty array counts as primitive.
    ArrayOfPrimitive,
    /// Array with at least one element that is not a string, number or boolean.
    ArrayOfObject,
    Object,
}

pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(items) if items.iter().all(is_primitive) => ValueKind::ArrayOfPrimitive,
        Value::Array(_) => ValueKind::ArrayOfObject,
        Value::Object(_) => ValueKind::Object,
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Presentation chosen for a string value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    Image,
    Html,
    Link,
    /// Longer than the markdown threshold.
    LongText,
    Plain,
}

pub fn classify_string(
    text: &str,
    image_hosts: &[String],
    markdown_threshold: usize,
) -> StringKind {
    if is_image_url(text, image_hosts) {
        StringKind::Image
    } else if is_html(text) {
        StringKind::Html
    } else if is_link(text) {
        StringKind::Link
    } else if text.chars().count() > markdown_threshold {
        StringKind::LongText
    } else {
        StringKind::Plain
    }
}

/// Presentation chosen for an object value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// `{ "$oid": "..." }`
    ObjectId,
    /// `{ "$date": ... }`
    Date,
    /// Has non-null `latitude` and `longitude`.
    Coordinates,
    /// Has `address` and `coordinates`.
    Address,
    /// Has a truthy `featured` flag.
    Featured,
    /// Non-empty and every value is a boolean.
    AllBoolean,
    /// Style-like field or contains image URLs.
    Gallery,
    Card,
}

pub fn classify_object(
    object: &Map<String, Value>,
    field_name: &str,
    image_hosts: &[String],
) -> ObjectKind {
    if matches!(object.get("$oid"), Some(Value::String(_))) {
        ObjectKind::ObjectId
    } else if object.get("$date").is_some_and(|v| !v.is_null()) {
        ObjectKind::Date
    } else if has_coordinates(object) {
        ObjectKind::Coordinates
    } else if object.contains_key("address") && object.contains_key("coordinates") {
        ObjectKind::Address
    } else if object.get("featured").is_some_and(is_truthy) {
        ObjectKind::Featured
    } else if !object.is_empty() && object.values().all(Value::is_boolean) {
        ObjectKind::AllBoolean
    } else if field_name.to_lowercase().contains("style")
        || object
            .values()
            .any(|v| v.as_str().is_some_and(|s| is_image_url(s, image_hosts)))
    {
        ObjectKind::Gallery
    } else {
        ObjectKind::Card
    }
}

/// Both `latitude` and `longitude` are present and not null.
pub fn has_coordinates(object: &Map<String, Value>) -> bool {
    ["latitude", "longitude"]
        .iter()
        .all(|key| object.get(*key).is_some_and(|v| !v.is_null()))
}

/// Truthiness as the backend's clients understand it: `false`, `0`, `""` and `null` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|bmp|webp|svg)(?:$|[/#&])").unwrap());

pub fn is_link(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// An http(s) URL pointing at an image file or at one of the image hosts.
pub fn is_image_url(text: &str, image_hosts: &[String]) -> bool {
    if !is_link(text) {
        return false;
    }

    let base = text.split('?').next().unwrap_or(text);
    if IMAGE_EXTENSION.is_match(base) {
        return true;
    }

    let host = url_host(text).to_lowercase();
    image_hosts.iter().any(|domain| {
        let domain = domain.to_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

/// Host part of an absolute URL, without user info and port.
fn url_host(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority.rsplit('@').next().unwrap_or(authority);
    host.split(':').next().unwrap_or(host)
}

static QUICK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(!|/?[a-zA-Z][\w:.-]*)\b[^>]*>").unwrap());

static ELEMENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<([a-zA-Z][\w:.-]*)(\s[^>]*)?/?>").unwrap());

static LEADING_CLOSE_OR_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(</[a-zA-Z]|<!)").unwrap());

/// Detect markup in a string.
///
/// No DOM parser is available here, so this only looks at tag syntax: something tag-like must
/// be present, and it has to be an element start tag, or the text must open with a closing tag
/// or a declaration.
pub fn is_html(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || !QUICK_TAG.is_match(trimmed) {
        return false;
    }

    ELEMENT_TAG.is_match(trimmed) || LEADING_CLOSE_OR_DECL.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn hosts() -> Vec<String> {
        crate::DEFAULT_IMAGE_HOSTS.iter().map(|h| h.to_string()).collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn value_kinds() {
        assert_eq!(classify(&json!(null)), ValueKind::Null);
        assert_eq!(classify(&json!(true)), ValueKind::Bool);
        assert_eq!(classify(&json!(1.5)), ValueKind::Number);
        assert_eq!(classify(&json!("x")), ValueKind::String);
        assert_eq!(classify(&json!([])), ValueKind::ArrayOfPrimitive);
        assert_eq!(classify(&json!(["a", 1, false])), ValueKind::ArrayOfPrimitive);
        assert_eq!(classify(&json!([{ "a": 1 }])), ValueKind::ArrayOfObject);
        assert_eq!(classify(&json!(["a", null])), ValueKind::ArrayOfObject);
        assert_eq!(classify(&json!({})), ValueKind::Object);
    }

    #[test]
    fn image_urls() {
        let hosts = hosts();
        assert!(is_image_url("https://cdn.example.com/a/photo.JPG", &hosts));
        assert!(is_image_url("http://example.com/logo.svg?v=3", &hosts));
        assert!(is_image_url("https://ik.imagekit.io/acho/banner", &hosts));
        assert!(is_image_url(
            "https://firebasestorage.googleapis.com/v0/b/app/o/x?alt=media",
            &hosts
        ));
        assert!(!is_image_url("https://example.com/report.pdf", &hosts));
        assert!(!is_image_url("https://example.com/?img=a.png", &hosts));
        assert!(!is_image_url("ftp://example.com/a.png", &hosts));
        assert!(!is_image_url("photo.png", &hosts));
        assert!(!is_image_url("https://notimgur.com/x", &hosts));
        assert!(is_image_url("https://cdn.example.com/a.png", &[]));
        assert!(!is_image_url("https://i.imgur.com/abc", &[]));
    }

    #[test]
    fn html_detection() {
        assert!(is_html("<p>Hola</p>"));
        assert!(is_html("  text with <strong>bold</strong> part "));
        assert!(is_html("<br/>"));
        assert!(is_html("</div> trailing"));
        assert!(is_html("<!DOCTYPE html><html></html>"));
        assert!(!is_html("a < b and c > d"));
        assert!(!is_html("1 <2> 3"));
        assert!(!is_html(""));
        assert!(!is_html("plain text"));
    }

    #[test]
    fn string_kinds() {
        let hosts = hosts();
        let kind = |s: &str| classify_string(s, &hosts, 200);
        assert_eq!(kind("https://x.com/a.png"), StringKind::Image);
        assert_eq!(kind("<em>x</em>"), StringKind::Html);
        assert_eq!(kind("https://acho.com.co"), StringKind::Link);
        assert_eq!(kind(&"a".repeat(250)), StringKind::LongText);
        assert_eq!(kind(&"a".repeat(150)), StringKind::Plain);
        assert_eq!(kind(&"a".repeat(200)), StringKind::Plain);
        assert_eq!(kind(&"ñ".repeat(150)), StringKind::Plain);
    }

    #[test]
    fn object_kinds() {
        let hosts = hosts();
        let kind = |v: Value, field: &str| classify_object(&object(v), field, &hosts);

        assert_eq!(kind(json!({ "$oid": "66f1" }), "_id"), ObjectKind::ObjectId);
        assert_eq!(kind(json!({ "$date": "2024-11-01T09:00:00Z" }), "d"), ObjectKind::Date);
        assert_eq!(
            kind(json!({ "latitude": 4.69, "longitude": -74.03 }), "location"),
            ObjectKind::Coordinates
        );
        assert_eq!(
            kind(json!({ "address": "Bogotá", "coordinates": {} }), "location"),
            ObjectKind::Address
        );
        assert_eq!(
            kind(json!({ "featured": true, "rank": 1 }), "highlight"),
            ObjectKind::Featured
        );
        assert_eq!(
            kind(json!({ "featured": false, "rank": 1 }), "highlight"),
            ObjectKind::Card
        );
        assert_eq!(
            kind(json!({ "chat": true, "agenda": false }), "modules"),
            ObjectKind::AllBoolean
        );
        assert_eq!(kind(json!({ "color": "#fff" }), "eventStyles"), ObjectKind::Gallery);
        assert_eq!(
            kind(json!({ "banner": "https://x.com/b.webp", "n": 1 }), "media"),
            ObjectKind::Gallery
        );
        assert_eq!(
            kind(json!({ "latitude": 0, "longitude": 0 }), "location"),
            ObjectKind::Coordinates
        );
        assert_eq!(
            kind(json!({ "latitude": null, "longitude": null }), "location"),
            ObjectKind::Card
        );
        assert_eq!(
            kind(json!({ "latitude": 4.69, "longitude": null }), "location"),
            ObjectKind::Card
        );
        assert_eq!(kind(json!({ "name": "x" }), "organizer"), ObjectKind::Card);
        assert_eq!(kind(json!({}), "empty"), ObjectKind::Card);
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }
}
