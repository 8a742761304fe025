use std::borrow::Cow;
use std::sync::LazyLock;

use handlebars::html_escape;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};

use crate::node::{Coordinates, Entry, Node, Tile};
use crate::Locale;

const ACTIVE_ELEMENTS: [&str; 12] = [
    "script", "style", "iframe", "object", "embed", "applet", "noscript", "frame", "frameset",
    "base", "link", "meta",
];

const URL_ATTRIBUTES: [&str; 9] = [
    "href",
    "src",
    "action",
    "formaction",
    "xlink:href",
    "poster",
    "background",
    "data",
    "cite",
];

static ACTIVE_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ACTIVE_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

static ACTIVE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)</?({})\b[^>]*>?", ACTIVE_ELEMENTS.join("|"))).unwrap()
});

// Quoted values may contain `>`. An unterminated tag runs to the end of the input.
static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([a-zA-Z][^\s/>]*)((?:"[^"]*"|'[^']*'|[^>])*)>?"#).unwrap()
});

// Anything that is not part of a name or value separates attributes, `/` included.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>][^\s>]*))?"#).unwrap()
});

static CHARACTER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([a-zA-Z]+));?").unwrap()
});

/// Strip active content from an HTML fragment.
///
/// `script`, `style`, `iframe`, `object`, `embed` and the other active elements are removed
/// together with their content, repeatedly, until no such tag is left. Every remaining start
/// tag is then written back from its parsed attributes: `on*` event handlers are dropped and
/// URL attributes whose decoded value uses the `javascript:`, `vbscript:` or a non-image
/// `data:` scheme are replaced by `#`. Text and end tags are kept as is.
pub fn sanitize_html(input: &str) -> String {
    let mut text = input.to_string();
    loop {
        let mut next = text.clone();
        for block in ACTIVE_BLOCKS.iter() {
            next = block.replace_all(&next, "").into_owned();
        }
        let next = ACTIVE_TAG.replace_all(&next, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    START_TAG
        .replace_all(&text, |caps: &Captures| rebuild_start_tag(&caps[1], &caps[2]))
        .into_owned()
}

fn rebuild_start_tag(name: &str, attributes: &str) -> String {
    let mut tag = format!("<{name}");
    for attr in ATTRIBUTE.captures_iter(attributes) {
        let attr_name = attr[1].to_ascii_lowercase();
        if attr_name.starts_with("on") {
            continue;
        }

        tag.push(' ');
        match attr.get(2) {
            Some(value)
                if URL_ATTRIBUTES.contains(&attr_name.as_str())
                    && is_script_url(unquote(value.as_str())) =>
            {
                tag.push_str(&attr[1]);
                tag.push_str("=\"#\"");
            }
            _ => tag.push_str(&attr[0]),
        }
    }
    if attributes.trim_end().ends_with('/') {
        tag.push_str(" /");
    }
    tag.push('>');
    tag
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Whether a browser would run `value` as script when following it.
fn is_script_url(value: &str) -> bool {
    let url: String = decode_character_references(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();

    url.starts_with("javascript:")
        || url.starts_with("vbscript:")
        || (url.starts_with("data:") && !url.starts_with("data:image/"))
}

/// Numeric references and the named ones that can spell out a URL scheme.
fn decode_character_references(text: &str) -> Cow<'_, str> {
    CHARACTER_REFERENCE.replace_all(text, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(decimal)) => decimal.as_str().parse().ok(),
            (None, None) => None,
        };
        if let Some(c) = code.and_then(char::from_u32) {
            return c.to_string();
        }

        match caps.get(3).map(|name| name.as_str()) {
            Some("colon") => ":".to_string(),
            Some("Tab") => "\t".to_string(),
            Some("NewLine") => "\n".to_string(),
            _ => caps[0].to_string(),
        }
    })
}

/// Render markdown source to sanitized HTML.
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(source, options));
    sanitize_html(&out)
}

impl Node {
    /// Append the HTML of this node to `out`.
    pub fn write_html(&self, out: &mut String, locale: Locale) {
        match self {
            Node::Placeholder => out.push_str("<span class=\"dimmed\">\u{2014}</span>"),
            Node::EmptyList => {
                out.push_str("<span class=\"dimmed\">");
                out.push_str(&html_escape(locale.empty_list()));
                out.push_str("</span>");
            }
            Node::Chips(chips) => {
                out.push_str("<div class=\"chips\">");
                for chip in chips {
                    out.push_str("<span class=\"badge\">");
                    out.push_str(&html_escape(chip));
                    out.push_str("</span>");
                }
                out.push_str("</div>");
            }
            Node::ItemList(items) => {
                out.push_str("<div class=\"stack\">");
                for (i, item) in items.iter().enumerate() {
                    out.push_str("<div class=\"card\"><div class=\"card-title\">");
                    out.push_str(&html_escape(&locale.item(i + 1)));
                    out.push_str("</div>");
                    item.write_html(out, locale);
                    out.push_str("</div>");
                }
                out.push_str("</div>");
            }
            Node::ObjectId(id) => {
                out.push_str("<code class=\"dimmed\">");
                out.push_str(&html_escape(id));
                out.push_str("</code>");
            }
            Node::Date(date) => {
                out.push_str("<span class=\"date\">");
                out.push_str(&html_escape(date));
                out.push_str("</span>");
            }
            Node::Image(src) => write_image(out, src),
            Node::Html(html) => {
                out.push_str("<div class=\"html\">");
                out.push_str(html);
                out.push_str("</div>");
            }
            Node::Link(url) => {
                let url = html_escape(url);
                out.push_str("<a href=\"");
                out.push_str(&url);
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                out.push_str(&url);
                out.push_str("</a>");
            }
            Node::YesNo(value) => write_badge(out, *value, locale),
            Node::Number(number) => {
                out.push_str("<span class=\"number\">");
                out.push_str(&html_escape(number));
                out.push_str("</span>");
            }
            Node::Markdown(source) => {
                out.push_str("<div class=\"markdown\">");
                out.push_str(&markdown_to_html(source));
                out.push_str("</div>");
            }
            Node::Text(text) => {
                out.push_str("<span class=\"text\">");
                out.push_str(&html_escape(text));
                out.push_str("</span>");
            }
            Node::Coordinates(coordinates) => write_coordinates(out, coordinates, locale),
            Node::Address {
                address,
                coordinates,
            } => {
                out.push_str("<div class=\"stack\"><div><strong>");
                out.push_str(&html_escape(locale.address()));
                out.push_str(":</strong> ");
                out.push_str(&html_escape(address));
                out.push_str("</div>");
                coordinates.write_html(out, locale);
                out.push_str("</div>");
            }
            Node::Featured(entries) => {
                out.push_str("<div class=\"stack\"><span class=\"badge badge-yellow\">");
                out.push_str(&html_escape(locale.featured()));
                out.push_str("</span>");
                write_card(out, entries, locale);
                out.push_str("</div>");
            }
            Node::BooleanGrid(flags) => {
                out.push_str("<div class=\"grid\">");
                for (label, value) in flags {
                    out.push_str("<div class=\"grid-item\"><span>");
                    out.push_str(&html_escape(label));
                    out.push_str("</span>");
                    write_badge(out, *value, locale);
                    out.push_str("</div>");
                }
                out.push_str("</div>");
            }
            Node::Gallery(tiles) => {
                out.push_str("<div class=\"grid gallery\">");
                for tile in tiles {
                    write_tile(out, tile);
                }
                out.push_str("</div>");
            }
            Node::Card(entries) => write_card(out, entries, locale),
        }
    }

    /// HTML of this node.
    pub fn to_html(&self, locale: Locale) -> String {
        let mut out = String::new();
        self.write_html(&mut out, locale);
        out
    }
}

fn write_image(out: &mut String, src: &str) {
    out.push_str("<img class=\"thumbnail\" src=\"");
    out.push_str(&html_escape(src));
    out.push_str("\" alt=\"\" loading=\"lazy\">");
}

fn write_badge(out: &mut String, value: bool, locale: Locale) {
    let (class, text) = match value {
        true => ("badge-green", locale.yes()),
        false => ("badge-red", locale.no()),
    };
    out.push_str("<span class=\"badge ");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(&html_escape(text));
    out.push_str("</span>");
}

fn write_coordinates(out: &mut String, coordinates: &Coordinates, locale: Locale) {
    out.push_str("<div class=\"card coordinates\"><div><strong>");
    out.push_str(&html_escape(locale.latitude()));
    out.push_str(":</strong> ");
    out.push_str(&html_escape(&coordinates.latitude));
    out.push_str("</div><div><strong>");
    out.push_str(&html_escape(locale.longitude()));
    out.push_str(":</strong> ");
    out.push_str(&html_escape(&coordinates.longitude));
    out.push_str("</div><a href=\"");
    out.push_str(&html_escape(&coordinates.map_url()));
    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    out.push_str(&html_escape(locale.view_on_map()));
    out.push_str("</a></div>");
}

fn write_card(out: &mut String, entries: &[Entry], locale: Locale) {
    out.push_str("<div class=\"card\">");
    for entry in entries {
        out.push_str("<div class=\"entry\"><span class=\"entry-label\">");
        out.push_str(&html_escape(&entry.label));
        out.push_str(":</span> ");
        entry.node.write_html(out, locale);
        out.push_str("</div>");
    }
    out.push_str("</div>");
}

fn write_tile(out: &mut String, tile: &Tile) {
    out.push_str("<div class=\"tile\"><div class=\"tile-label\">");
    out.push_str(&html_escape(&tile.label));
    out.push_str("</div>");
    if tile.image {
        write_image(out, &tile.content);
    } else {
        out.push_str("<span class=\"text\">");
        out.push_str(&html_escape(&tile.content));
        out.push_str("</span>");
    }
    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_active_content() {
        assert_eq!(
            sanitize_html(
                r#"<p onclick="steal()">Hola</p><script>alert(1)</script><a href="javascript:alert(1)">x</a>"#
            ),
            r##"<p>Hola</p><a href="#">x</a>"##
        );
        assert_eq!(
            sanitize_html("<img src=x onerror=alert(1)><STYLE>p{}</STYLE>"),
            "<img src=x>"
        );
        assert_eq!(sanitize_html("<iframe src=\"https://x.com\">"), "");
        assert_eq!(
            sanitize_html("<p>one\n<script type=\"text/javascript\">\nbad()\n</script>two</p>"),
            "<p>one\ntwo</p>"
        );

        // slash as attribute separator
        assert_eq!(
            sanitize_html(r#"<img src="x"/onerror=alert(1)>"#),
            r#"<img src="x">"#
        );
        assert_eq!(
            sanitize_html("<svg/onload=alert(1)>"),
            "<svg>"
        );

        // character references in URLs
        assert_eq!(
            sanitize_html(r#"<a href="java&#115;cript:alert(1)">x</a>"#),
            r##"<a href="#">x</a>"##
        );
        assert_eq!(
            sanitize_html(r#"<a href="&#x6A;ava&Tab;script&colon;alert(1)">x</a>"#),
            r##"<a href="#">x</a>"##
        );
        assert_eq!(
            sanitize_html("<a href=' JaVaScRiPt:alert(1)'>x</a>"),
            r##"<a href="#">x</a>"##
        );

        // removal must not splice a new tag together
        let spliced = sanitize_html("<scr<script>ipt>alert(1)");
        assert!(!spliced.to_lowercase().contains("<script"), "{spliced}");
        let nested = sanitize_html("<scr<script>ipt>alert(1)</scr</script>ipt>");
        assert!(!nested.to_lowercase().contains("<script"), "{nested}");

        // `>` inside a quoted value does not end the tag
        assert_eq!(
            sanitize_html(r#"<a title=">" onclick="x()">y</a>"#),
            r#"<a title=">">y</a>"#
        );
    }

    #[test]
    fn sanitize_keeps_markup() {
        let html = r#"<h2>Agenda</h2><ul><li><a href="https://acho.com.co">Inscripción</a></li></ul>"#;
        assert_eq!(sanitize_html(html), html);
        assert_eq!(sanitize_html("the online=true flag"), "the online=true flag");
        assert_eq!(
            sanitize_html(r#"<img src="data:image/png;base64,AAAA" alt="logo" />"#),
            r#"<img src="data:image/png;base64,AAAA" alt="logo" />"#
        );
        assert_eq!(
            sanitize_html(r#"<a href="/agenda?day=1&amp;room=2">Agenda</a>"#),
            r#"<a href="/agenda?day=1&amp;room=2">Agenda</a>"#
        );
    }

    #[test]
    fn markdown() {
        let html = markdown_to_html("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));

        let html = markdown_to_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn escaped_output() {
        assert_eq!(
            Node::Text("<b>&</b>".into()).to_html(Locale::En),
            "<span class=\"text\">&lt;b&gt;&amp;&lt;/b&gt;</span>"
        );
        assert_eq!(
            Node::YesNo(true).to_html(Locale::En),
            "<span class=\"badge badge-green\">Yes</span>"
        );
        assert_eq!(
            Node::YesNo(false).to_html(Locale::Es),
            "<span class=\"badge badge-red\">No</span>"
        );
        assert_eq!(
            Node::Placeholder.to_html(Locale::En),
            "<span class=\"dimmed\">\u{2014}</span>"
        );
        assert!(Node::EmptyList.to_html(Locale::Es).contains("Lista vacía"));
    }

    #[test]
    fn coordinates_link() {
        let html = Node::Coordinates(Coordinates {
            latitude: "4.69".into(),
            longitude: "-74.03".into(),
        })
        .to_html(Locale::En);

        assert!(html.contains("4.69"));
        assert!(html.contains("-74.03"));
        assert!(html.contains("<a href=\"https://maps.google.com?q"));
        assert!(html.contains("4.69,-74.03\" target=\"_blank\""));
        assert!(html.contains("View on Google Maps"));
    }
}
