use serde_json::{Map, Value};

use crate::classify::{classify, classify_object, classify_string, has_coordinates, is_image_url};
use crate::classify::{ObjectKind, StringKind, ValueKind};
use crate::label::format_field_name;
use crate::locale::parse_date;
use crate::RenderOptions;

/// Rendering tree of a single value.
///
/// Labels, numbers and dates are already formatted for the requested locale. HTML is produced
/// by [`Node::write_html`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Missing value.
    Placeholder,
    /// Array without elements.
    EmptyList,
    /// One badge per primitive array element.
    Chips(Vec<String>),
    /// One sub-card per array element.
    ItemList(Vec<Node>),
    /// Raw database id in monospace.
    ObjectId(String),
    /// Formatted date.
    Date(String),
    Image(String),
    /// Sanitized markup.
    Html(String),
    Link(String),
    YesNo(bool),
    /// Formatted number.
    Number(String),
    /// Markdown source.
    Markdown(String),
    Text(String),
    Coordinates(Coordinates),
    Address { address: String, coordinates: Box<Node> },
    /// Featured badge followed by the remaining entries.
    Featured(Vec<Entry>),
    BooleanGrid(Vec<(String, bool)>),
    Gallery(Vec<Tile>),
    Card(Vec<Entry>),
}

/// A labeled value inside an object rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key: String,
    pub label: String,
    pub node: Node,
}

/// Geographic position with its map link.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn map_url(&self) -> String {
        format!(
            "https://maps.google.com?q={},{}",
            self.latitude.trim(),
            self.longitude.trim()
        )
    }
}

/// Gallery tile, an image or plain text.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub label: String,
    pub image: bool,
    pub content: String,
}

/// Plain text of a scalar value. Strings are taken verbatim.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Render a record value with the top-level classification.
pub fn render_value(value: &Value, field_name: &str, options: &RenderOptions) -> Node {
    match (classify(value), value) {
        (ValueKind::Null, _) => Node::Placeholder,
        (ValueKind::ArrayOfPrimitive, Value::Array(items)) if items.is_empty() => Node::EmptyList,
        (ValueKind::ArrayOfPrimitive, Value::Array(items)) => {
            Node::Chips(items.iter().map(value_to_string).collect())
        }
        (ValueKind::ArrayOfObject, Value::Array(items)) => Node::ItemList(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let name = format!("{field_name}[{i}]");
                    match item {
                        Value::Object(object) => render_object(object, &name, options),
                        other => render_value(other, &name, options),
                    }
                })
                .collect(),
        ),
        (ValueKind::Object, Value::Object(object)) => render_object(object, field_name, options),
        (ValueKind::Bool, Value::Bool(b)) => Node::YesNo(*b),
        (ValueKind::Number, Value::Number(n)) => Node::Number(options.locale.format_number(n)),
        (ValueKind::String, Value::String(text)) => render_string(text, options),
        (kind, other) => {
            log::debug!("unexpected {kind:?} value in field '{field_name}', showing as text");
            Node::Text(value_to_string(other))
        }
    }
}

fn render_string(text: &str, options: &RenderOptions) -> Node {
    match classify_string(text, &options.image_hosts, options.markdown_threshold) {
        StringKind::Image => Node::Image(text.to_string()),
        StringKind::Html => Node::Html(crate::html::sanitize_html(text)),
        StringKind::Link => Node::Link(text.to_string()),
        StringKind::LongText => Node::Markdown(text.to_string()),
        StringKind::Plain => Node::Text(text.to_string()),
    }
}

/// Render an object with the nested classification.
pub fn render_object(
    object: &Map<String, Value>,
    field_name: &str,
    options: &RenderOptions,
) -> Node {
    match classify_object(object, field_name, &options.image_hosts) {
        ObjectKind::ObjectId => match object.get("$oid") {
            Some(id) => Node::ObjectId(value_to_string(id)),
            None => Node::Placeholder,
        },
        ObjectKind::Date => render_date(object.get("$date").unwrap_or(&Value::Null), options),
        ObjectKind::Coordinates => Node::Coordinates(coordinates(object)),
        ObjectKind::Address => {
            let address = object.get("address").map(value_to_string).unwrap_or_default();
            let coordinates = match object.get("coordinates") {
                Some(Value::Object(inner)) if has_coordinates(inner) => {
                    Node::Coordinates(coordinates(inner))
                }
                Some(other) => render_value(other, "coordinates", options),
                None => Node::Placeholder,
            };
            Node::Address {
                address,
                coordinates: Box::new(coordinates),
            }
        }
        ObjectKind::Featured => Node::Featured(
            object
                .iter()
                .filter(|(key, _)| *key != "featured")
                .map(|(key, value)| entry(key, value, options))
                .collect(),
        ),
        ObjectKind::AllBoolean => Node::BooleanGrid(
            object
                .iter()
                .map(|(key, value)| (label(key, options), value.as_bool().unwrap_or(false)))
                .collect(),
        ),
        ObjectKind::Gallery => Node::Gallery(
            object
                .iter()
                .map(|(key, value)| {
                    let image = value
                        .as_str()
                        .is_some_and(|s| is_image_url(s, &options.image_hosts));
                    Tile {
                        label: label(key, options),
                        image,
                        content: value_to_string(value),
                    }
                })
                .collect(),
        ),
        ObjectKind::Card => Node::Card(
            object
                .iter()
                .map(|(key, value)| entry(key, value, options))
                .collect(),
        ),
    }
}

fn render_date(value: &Value, options: &RenderOptions) -> Node {
    match parse_date(value) {
        Some(date) => Node::Date(options.locale.format_date(&date)),
        None => {
            log::debug!("unparsable date {value}, showing as text");
            Node::Text(value_to_string(value))
        }
    }
}

fn coordinates(object: &Map<String, Value>) -> Coordinates {
    let part = |key: &str| object.get(key).map(value_to_string).unwrap_or_default();
    Coordinates {
        latitude: part("latitude"),
        longitude: part("longitude"),
    }
}

fn entry(key: &str, value: &Value, options: &RenderOptions) -> Entry {
    Entry {
        key: key.to_string(),
        label: label(key, options),
        node: render_value(value, key, options),
    }
}

fn label(key: &str, options: &RenderOptions) -> String {
    format_field_name(key, &options.field_labels)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Locale;

    fn render(value: Value, field: &str) -> Node {
        render_value(&value, field, &RenderOptions::default())
    }

    #[test]
    fn scalars() {
        assert_eq!(render(json!(null), "a"), Node::Placeholder);
        assert_eq!(render(json!(true), "a"), Node::YesNo(true));
        assert_eq!(render(json!(1234), "a"), Node::Number("1,234".into()));
        assert_eq!(render(json!("Bogotá"), "a"), Node::Text("Bogotá".into()));
        assert_eq!(
            render(json!("https://acho.com.co"), "a"),
            Node::Link("https://acho.com.co".into())
        );
        assert_eq!(
            render(json!("https://x.com/logo.png"), "a"),
            Node::Image("https://x.com/logo.png".into())
        );
        assert_eq!(render(json!("<b>hi</b>"), "a"), Node::Html("<b>hi</b>".into()));
    }

    #[test]
    fn long_strings() {
        let long = "palabra ".repeat(32);
        assert!(long.len() > 200);
        assert_eq!(render(json!(long.clone()), "a"), Node::Markdown(long));

        let text = "x".repeat(250);
        assert!(matches!(render(json!(text), "a"), Node::Markdown(_)));
        let text = "x".repeat(150);
        assert!(matches!(render(json!(text), "a"), Node::Text(_)));
    }

    #[test]
    fn arrays() {
        assert_eq!(
            render(json!(["x", "y"]), "tags"),
            Node::Chips(vec!["x".into(), "y".into()])
        );
        assert_eq!(render(json!([]), "tags"), Node::EmptyList);
        assert_eq!(
            render(json!([1, true]), "tags"),
            Node::Chips(vec!["1".into(), "true".into()])
        );

        let Node::ItemList(items) = render(json!([{ "name": "A" }, { "$oid": "66" }, null]), "x")
        else {
            panic!("expected item list");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], Node::Card(entries) if entries[0].label == "Name"));
        assert_eq!(items[1], Node::ObjectId("66".into()));
        assert_eq!(items[2], Node::Placeholder);
    }

    #[test]
    fn wrappers() {
        assert_eq!(
            render(json!({ "$oid": "66f1e0b5c2" }), "_id"),
            Node::ObjectId("66f1e0b5c2".into())
        );
        assert_eq!(
            render(json!({ "$date": "2024-11-01T09:00:00Z" }), "startDate"),
            Node::Date("November 1, 2024, 09:00".into())
        );

        let options = RenderOptions::default().locale(Locale::Es);
        assert_eq!(
            render_value(&json!({ "$date": { "$numberLong": "1730451600000" } }), "d", &options),
            Node::Date("1 de noviembre de 2024, 09:00".into())
        );
        assert_eq!(
            render(json!({ "$date": "someday" }), "d"),
            Node::Text("someday".into())
        );
    }

    #[test]
    fn coordinates_card() {
        let node = render(json!({ "latitude": 4.69, "longitude": -74.03 }), "location");
        let Node::Coordinates(coordinates) = node else {
            panic!("expected coordinates");
        };
        assert_eq!(coordinates.latitude, "4.69");
        assert_eq!(coordinates.longitude, "-74.03");
        assert_eq!(coordinates.map_url(), "https://maps.google.com?q=4.69,-74.03");

        let node = render(json!({ "latitude": null, "longitude": null }), "location");
        assert!(matches!(node, Node::Card(entries) if entries.len() == 2));
    }

    #[test]
    fn address_card() {
        let node = render(
            json!({
                "address": "Cra 7 # 32-16, Bogotá",
                "coordinates": { "latitude": 4.61, "longitude": -74.07 },
            }),
            "location",
        );
        let Node::Address {
            address,
            coordinates,
        } = node
        else {
            panic!("expected address");
        };
        assert_eq!(address, "Cra 7 # 32-16, Bogotá");
        assert!(matches!(*coordinates, Node::Coordinates(_)));

        let node = render(json!({ "address": "Medellín", "coordinates": null }), "venue");
        assert!(matches!(
            node,
            Node::Address { coordinates, .. } if *coordinates == Node::Placeholder
        ));

        let node = render(
            json!({ "address": "Cali", "coordinates": { "latitude": null, "longitude": null } }),
            "venue",
        );
        let Node::Address { coordinates, .. } = node else {
            panic!("expected address");
        };
        assert!(matches!(*coordinates, Node::Card(_)));
    }

    #[test]
    fn featured_object() {
        let node = render(json!({ "featured": true, "title": "Keynote", "rank": 2 }), "h");
        let Node::Featured(entries) = node else {
            panic!("expected featured");
        };
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["title", "rank"]);
        assert_eq!(entries[1].node, Node::Number("2".into()));
    }

    #[test]
    fn boolean_grid() {
        assert_eq!(
            render(json!({ "chatEnabled": true, "agenda": false }), "modules"),
            Node::BooleanGrid(vec![
                ("Chat Enabled".into(), true),
                ("Agenda".into(), false)
            ])
        );
    }

    #[test]
    fn gallery() {
        let node = render(
            json!({ "banner": "https://res.cloudinary.com/x/banner", "primaryColor": "#123456" }),
            "eventStyles",
        );
        assert_eq!(
            node,
            Node::Gallery(vec![
                Tile {
                    label: "Banner".into(),
                    image: true,
                    content: "https://res.cloudinary.com/x/banner".into(),
                },
                Tile {
                    label: "Primary Color".into(),
                    image: false,
                    content: "#123456".into(),
                },
            ])
        );
    }

    #[test]
    fn default_card_recurses() {
        let node = render(
            json!({ "name": "ACHO", "members": 1500, "tags": [], "site": "https://acho.com.co" }),
            "organization",
        );
        let Node::Card(entries) = node else {
            panic!("expected card");
        };
        assert_eq!(entries[0].node, Node::Text("ACHO".into()));
        assert_eq!(entries[1].node, Node::Number("1,500".into()));
        assert_eq!(entries[2].node, Node::EmptyList);
        assert_eq!(entries[3].node, Node::Link("https://acho.com.co".into()));

        assert_eq!(render(json!({}), "empty"), Node::Card(Vec::new()));
    }
}
