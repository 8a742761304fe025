//! Schema-less rendering of backend records for detail views.
//!
//! [`render_record`] orders, filters and labels the fields of a record and picks a presentation
//! for every value from its shape alone: ids and dates in their database wrappers, coordinates,
//! image URLs, inline HTML, links, long markdown text and so on. The result is a tree of
//! [`Node`]s which can be written out as HTML.
//!
//! ```
//! use eventdesk_renderer::{render_record, Node, RenderOptions};
//! use serde_json::json;
//!
//! let record = json!({ "a": 1, "b": true, "c": null });
//! let rendered = render_record(record.as_object().unwrap(), &RenderOptions::default());
//!
//! assert_eq!(rendered.names(), ["a", "b", "c"]);
//! assert_eq!(rendered.fields[1].node, Node::YesNo(true));
//! assert!(rendered.to_html().contains("badge-green"));
//! ```

use std::collections::HashSet;

use handlebars::html_escape;
use serde_json::{Map, Value};

pub mod classify;
mod html;
mod label;
mod locale;
mod node;
mod options;

pub use html::{markdown_to_html, sanitize_html};
pub use label::format_field_name;
pub use locale::{parse_date, Locale};
pub use node::{render_object, render_value, Coordinates, Entry, Node, Tile};
pub use options::{RenderOptions, DEFAULT_IMAGE_HOSTS, DEFAULT_MARKDOWN_THRESHOLD};

/// A rendered top-level field.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub node: Node,
}

/// All rendered fields of a record, in display order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRecord {
    pub fields: Vec<RenderedField>,
    pub locale: Locale,
}

impl RenderedRecord {
    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn write_html(&self, out: &mut String) {
        out.push_str("<div class=\"entity\">\n");
        for field in &self.fields {
            out.push_str("  <section class=\"entity-field\" data-field=\"");
            out.push_str(&html_escape(&field.name));
            out.push_str("\">\n    <h4>");
            out.push_str(&html_escape(&field.label));
            out.push_str("</h4>\n    <div class=\"entity-value\">");
            field.node.write_html(out, self.locale);
            out.push_str("</div>\n  </section>\n");
        }
        out.push_str("</div>\n");
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

/// Render every displayed field of `record`.
///
/// Fields named in [`RenderOptions::field_order`] come first, in that order, followed by the
/// remaining fields in record order. Excluded fields are dropped in any case.
pub fn render_record(record: &Map<String, Value>, options: &RenderOptions) -> RenderedRecord {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(record.len());

    let prioritized = options
        .field_order
        .iter()
        .filter(|name| record.contains_key(name.as_str()))
        .map(String::as_str);

    for name in prioritized.chain(record.keys().map(String::as_str)) {
        if options.is_excluded(name) || !seen.insert(name) {
            continue;
        }
        order.push(name);
    }

    let fields = order
        .into_iter()
        .filter_map(|name| {
            let value = record.get(name)?;
            Some(RenderedField {
                name: name.to_string(),
                label: format_field_name(name, &options.field_labels),
                node: render_value(value, name, options),
            })
        })
        .collect();

    RenderedRecord {
        fields,
        locale: options.locale,
    }
}
