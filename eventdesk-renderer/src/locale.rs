//! UI strings, number and date formatting for the supported display languages.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Display language of rendered records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    /// English
    En,
    /// Spanish
    Es,
}
serde_plain::derive_display_from_serialize!(Locale);
serde_plain::derive_fromstr_from_deserialize!(Locale);

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

impl Locale {
    pub fn yes(self) -> &'static str {
        match self {
            Locale::En => "Yes",
            Locale::Es => "Sí",
        }
    }

    pub fn no(self) -> &'static str {
        "No"
    }

    pub fn empty_list(self) -> &'static str {
        match self {
            Locale::En => "Empty list",
            Locale::Es => "Lista vacía",
        }
    }

    /// Title of the `n`th (1-based) sub-card of an item list.
    pub fn item(self, n: usize) -> String {
        match self {
            Locale::En => format!("Item {n}"),
            Locale::Es => format!("Elemento {n}"),
        }
    }

    pub fn featured(self) -> &'static str {
        match self {
            Locale::En => "Featured",
            Locale::Es => "Destacado",
        }
    }

    pub fn latitude(self) -> &'static str {
        match self {
            Locale::En => "Latitude",
            Locale::Es => "Latitud",
        }
    }

    pub fn longitude(self) -> &'static str {
        match self {
            Locale::En => "Longitude",
            Locale::Es => "Longitud",
        }
    }

    pub fn address(self) -> &'static str {
        match self {
            Locale::En => "Address",
            Locale::Es => "Dirección",
        }
    }

    pub fn view_on_map(self) -> &'static str {
        match self {
            Locale::En => "View on Google Maps",
            Locale::Es => "Ver en Google Maps",
        }
    }

    fn separators(self) -> (char, char) {
        match self {
            Locale::En => (',', '.'),
            Locale::Es => ('.', ','),
        }
    }

    /// Minimum number of integer digits before grouping kicks in.
    fn min_grouping_digits(self) -> usize {
        match self {
            Locale::En => 4,
            Locale::Es => 5,
        }
    }

    /// Format a JSON number with thousands separators and at most three fraction digits.
    pub fn format_number(self, number: &Number) -> String {
        let plain = if number.is_f64() {
            match number.as_f64() {
                Some(value) => format_fraction(value),
                None => number.to_string(),
            }
        } else {
            number.to_string()
        };

        let (negative, digits) = match plain.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, plain.as_str()),
        };
        let (integer, fraction) = match digits.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (digits, None),
        };

        let (group_sep, decimal_sep) = self.separators();
        let mut out = String::with_capacity(plain.len() + integer.len() / 3);
        if negative {
            out.push('-');
        }
        if integer.len() >= self.min_grouping_digits() {
            for (i, c) in integer.chars().enumerate() {
                if i > 0 && (integer.len() - i) % 3 == 0 {
                    out.push(group_sep);
                }
                out.push(c);
            }
        } else {
            out.push_str(integer);
        }
        if let Some(fraction) = fraction {
            out.push(decimal_sep);
            out.push_str(fraction);
        }
        out
    }

    /// Long-form date and time in UTC, e.g. `November 1, 2024, 09:00`.
    pub fn format_date(self, date: &DateTime<Utc>) -> String {
        let month = date.month0() as usize;
        match self {
            Locale::En => format!(
                "{} {}, {}, {:02}:{:02}",
                MONTHS_EN[month],
                date.day(),
                date.year(),
                date.hour(),
                date.minute()
            ),
            Locale::Es => format!(
                "{} de {} de {}, {:02}:{:02}",
                date.day(),
                MONTHS_ES[month],
                date.year(),
                date.hour(),
                date.minute()
            ),
        }
    }
}

/// Round to three fraction digits and drop trailing zeros.
fn format_fraction(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" => "0".to_string(),
        text => text.to_string(),
    }
}

/// Parse the payload of a `$date` wrapper.
///
/// Accepts RFC 3339 strings (and plain `YYYY-MM-DD[THH:MM:SS]` taken as UTC), milliseconds since
/// the epoch, and `{"$numberLong": "..."}`.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_str(text.trim()),
        Value::Number(ms) => ms
            .as_i64()
            .or_else(|| ms.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => match map.get("$numberLong")? {
            Value::String(ms) => ms.trim().parse().ok().and_then(DateTime::from_timestamp_millis),
            Value::Number(ms) => ms.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
