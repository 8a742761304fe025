use std::collections::HashMap;

/// Human readable label for a record field.
///
/// An explicit entry in `labels` wins. Otherwise a space is put in front of every ASCII capital,
/// the first character is upper-cased, underscores become spaces and the result is trimmed, so
/// `startDate` becomes `Start Date` and `created_at` becomes `Created at`.
pub fn format_field_name(name: &str, labels: &HashMap<String, String>) -> String {
    if let Some(label) = labels.get(name) {
        return label.clone();
    }

    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let mut chars = spaced.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    capitalized.replace('_', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_labels() {
        let labels = HashMap::new();
        let label = |name| format_field_name(name, &labels);

        assert_eq!(label("startDate"), "Start Date");
        assert_eq!(label("created_at"), "Created at");
        assert_eq!(label("name"), "Name");
        assert_eq!(label("organizationId"), "Organization Id");
        assert_eq!(label("URL"), "U R L");
        assert_eq!(label("_id"), "id");
        assert_eq!(label("ñandú"), "Ñandú");
        assert_eq!(label(""), "");
    }

    #[test]
    fn explicit_labels() {
        let labels = HashMap::from([("startDate".to_string(), "Fecha de inicio".to_string())]);
        assert_eq!(format_field_name("startDate", &labels), "Fecha de inicio");
        assert_eq!(format_field_name("endDate", &labels), "End Date");
    }
}
