//! Query string encodings of a [`QueryDescriptor`].

use std::collections::BTreeMap;

use anyhow::{bail, format_err, Error};

use eventdesk_api_types::{
    CrudFilter, CrudOperator, CrudSort, Pagination, QueryDescriptor, SortOrder,
};

use crate::{ApiPathBuilder, FilterEncoding};

/// The list relevant parts of a query string, as recovered by [`decode_list_query`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub pagination: Option<Pagination>,
    pub filters: Vec<CrudFilter>,
    pub sorters: Vec<CrudSort>,
}

impl From<&QueryDescriptor> for ListQuery {
    fn from(descriptor: &QueryDescriptor) -> Self {
        Self {
            pagination: Some(descriptor.effective_pagination()),
            filters: descriptor.filters.clone(),
            sorters: descriptor.sorters.clone(),
        }
    }
}

/// Append pagination, filters and sorters of `descriptor` to `builder`.
pub fn encode_list_query(
    builder: ApiPathBuilder,
    descriptor: &QueryDescriptor,
    encoding: FilterEncoding,
) -> ApiPathBuilder {
    let pagination = descriptor.effective_pagination();
    match encoding {
        FilterEncoding::Flat => encode_flat(builder, pagination, descriptor),
        FilterEncoding::Indexed => encode_indexed(builder, pagination, descriptor),
    }
}

fn encode_flat(
    mut builder: ApiPathBuilder,
    pagination: Pagination,
    descriptor: &QueryDescriptor,
) -> ApiPathBuilder {
    builder = builder
        .arg("page", pagination.current)
        .arg("limit", pagination.page_size);

    for filter in &descriptor.filters {
        builder = match filter.operator {
            CrudOperator::Eq => builder.arg(&filter.field, &filter.value),
            op => builder.arg(&format!("{}_{op}", filter.field), &filter.value),
        };
    }

    if !descriptor.sorters.is_empty() {
        let sort = descriptor
            .sorters
            .iter()
            .map(|s| format!("{}:{}", s.field, s.order))
            .collect::<Vec<_>>()
            .join(",");
        builder = builder.arg("sort", sort);
    }

    builder
}

fn encode_indexed(
    mut builder: ApiPathBuilder,
    pagination: Pagination,
    descriptor: &QueryDescriptor,
) -> ApiPathBuilder {
    builder = builder
        .arg("current", pagination.current)
        .arg("pageSize", pagination.page_size);

    for (i, filter) in descriptor.filters.iter().enumerate() {
        builder = builder
            .arg(&format!("filters[{i}][field]"), &filter.field)
            .arg(&format!("filters[{i}][operator]"), filter.operator)
            .arg(&format!("filters[{i}][value]"), &filter.value);
    }

    for (i, sorter) in descriptor.sorters.iter().enumerate() {
        builder = builder
            .arg(&format!("sorters[{i}][field]"), &sorter.field)
            .arg(&format!("sorters[{i}][order]"), sorter.order);
    }

    builder
}

/// Recover pagination, filters and sorters from a query string produced by
/// [`encode_list_query`] with the same `encoding`.
///
/// A leading path and `?` are skipped. For the flat encoding, a key ending in `_<operator>` is
/// read as a filter with that operator, so field names must not end in an operator suffix.
pub fn decode_list_query(query: &str, encoding: FilterEncoding) -> Result<ListQuery, Error> {
    let query = match query.split_once('?') {
        Some((_path, query)) => query,
        None if query.starts_with('/') => "",
        None => query,
    };

    let pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();

    match encoding {
        FilterEncoding::Flat => decode_flat(pairs),
        FilterEncoding::Indexed => decode_indexed(pairs),
    }
}

fn decode_flat(pairs: Vec<(String, String)>) -> Result<ListQuery, Error> {
    let mut result = ListQuery::default();
    let mut current = None;
    let mut page_size = None;

    for (key, value) in pairs {
        match key.as_str() {
            "page" => current = Some(parse_number(&key, &value)?),
            "limit" => page_size = Some(parse_number(&key, &value)?),
            "sort" => {
                for entry in value.split(',').filter(|e| !e.is_empty()) {
                    let (field, order) = entry
                        .rsplit_once(':')
                        .ok_or_else(|| format_err!("sort entry '{entry}' has no order"))?;
                    let order = order
                        .parse::<SortOrder>()
                        .map_err(|_| format_err!("invalid sort order '{order}'"))?;
                    result.sorters.push(CrudSort::new(field, order));
                }
            }
            _ => result.filters.push(flat_filter(key, value)),
        }
    }

    result.pagination = merge_pagination(current, page_size);
    Ok(result)
}

fn flat_filter(key: String, value: String) -> CrudFilter {
    if let Some((field, op)) = key.rsplit_once('_') {
        if let Ok(operator) = op.parse::<CrudOperator>() {
            if operator != CrudOperator::Eq && !field.is_empty() {
                return CrudFilter::new(field, operator, value);
            }
        }
    }
    CrudFilter::new(key, CrudOperator::Eq, value)
}

#[derive(Default)]
struct PartialFilter {
    field: Option<String>,
    operator: Option<String>,
    value: Option<String>,
}

#[derive(Default)]
struct PartialSort {
    field: Option<String>,
    order: Option<String>,
}

fn decode_indexed(pairs: Vec<(String, String)>) -> Result<ListQuery, Error> {
    let mut current = None;
    let mut page_size = None;
    let mut filters = BTreeMap::<usize, PartialFilter>::new();
    let mut sorters = BTreeMap::<usize, PartialSort>::new();

    for (key, value) in pairs {
        match key.as_str() {
            "current" => current = Some(parse_number(&key, &value)?),
            "pageSize" => page_size = Some(parse_number(&key, &value)?),
            _ => match split_indexed_key(&key) {
                Some(("filters", index, part)) => {
                    let entry = filters.entry(index).or_default();
                    match part {
                        "field" => entry.field = Some(value),
                        "operator" => entry.operator = Some(value),
                        "value" => entry.value = Some(value),
                        _ => bail!("unknown filter attribute in '{key}'"),
                    }
                }
                Some(("sorters", index, part)) => {
                    let entry = sorters.entry(index).or_default();
                    match part {
                        "field" => entry.field = Some(value),
                        "order" => entry.order = Some(value),
                        _ => bail!("unknown sorter attribute in '{key}'"),
                    }
                }
                _ => log::debug!("ignoring unrelated query parameter '{key}'"),
            },
        }
    }

    let filters = filters
        .into_iter()
        .map(|(index, partial)| {
            let field = partial
                .field
                .ok_or_else(|| format_err!("filter {index} has no field"))?;
            let operator = partial
                .operator
                .ok_or_else(|| format_err!("filter {index} has no operator"))?;
            let operator = operator
                .parse::<CrudOperator>()
                .map_err(|_| format_err!("filter {index} has invalid operator '{operator}'"))?;
            Ok(CrudFilter::new(field, operator, partial.value.unwrap_or_default()))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let sorters = sorters
        .into_iter()
        .map(|(index, partial)| {
            let field = partial
                .field
                .ok_or_else(|| format_err!("sorter {index} has no field"))?;
            let order = match partial.order {
                Some(order) => order
                    .parse::<SortOrder>()
                    .map_err(|_| format_err!("sorter {index} has invalid order '{order}'"))?,
                None => SortOrder::default(),
            };
            Ok(CrudSort::new(field, order))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(ListQuery {
        pagination: merge_pagination(current, page_size),
        filters,
        sorters,
    })
}

/// Split `filters[3][field]` into `("filters", 3, "field")`.
fn split_indexed_key(key: &str) -> Option<(&str, usize, &str)> {
    let (group, rest) = key.split_once('[')?;
    let (index, rest) = rest.split_once("][")?;
    let part = rest.strip_suffix(']')?;
    Some((group, index.parse().ok()?, part))
}

fn parse_number(key: &str, value: &str) -> Result<u64, Error> {
    value
        .parse()
        .map_err(|_| format_err!("invalid value '{value}' for '{key}'"))
}

fn merge_pagination(current: Option<u64>, page_size: Option<u64>) -> Option<Pagination> {
    if current.is_none() && page_size.is_none() {
        return None;
    }
    let defaults = Pagination::default();
    Some(Pagination::new(
        current.unwrap_or(defaults.current),
        page_size.unwrap_or(defaults.page_size),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor::new("events")
            .page(2, 25)
            .filter(CrudFilter::eq("status", "published"))
            .filter(CrudFilter::new("name", CrudOperator::Contains, "Congreso & Foro"))
            .sort(CrudSort::desc("startDate"))
    }

    fn encode(descriptor: &QueryDescriptor, encoding: FilterEncoding) -> String {
        encode_list_query(ApiPathBuilder::resource(&descriptor.resource, None), descriptor, encoding)
            .build()
    }

    #[test]
    fn flat_encoding() {
        let path = encode(&descriptor(), FilterEncoding::Flat);
        assert_eq!(
            path,
            "/events?page=2&limit=25&status=published&name%5Fcontains=Congreso%20%26%20Foro\
             &sort=startDate%3Adesc"
        );
    }

    #[test]
    fn indexed_encoding() {
        let path = encode(&QueryDescriptor::new("speakers"), FilterEncoding::Indexed);
        assert_eq!(path, "/speakers?current=1&pageSize=10");

        let path = encode(&descriptor(), FilterEncoding::Indexed);
        assert!(path.starts_with("/events?current=2&pageSize=25&filters%5B0%5D%5Bfield%5D=status"));
        assert!(path.contains("filters%5B1%5D%5Boperator%5D=contains"));
        assert!(path.ends_with("sorters%5B0%5D%5Border%5D=desc"));
    }

    #[test]
    fn round_trip_both_encodings() {
        let descriptor = descriptor();
        for encoding in [FilterEncoding::Flat, FilterEncoding::Indexed] {
            let path = encode(&descriptor, encoding);
            let decoded = decode_list_query(&path, encoding).unwrap();
            assert_eq!(decoded, ListQuery::from(&descriptor), "encoding {encoding}");
        }
    }

    #[test]
    fn round_trip_list_operators() {
        let descriptor = QueryDescriptor::new("agendas")
            .filter(CrudFilter::list("room", CrudOperator::In, ["A", "B"]))
            .filter(CrudFilter::new("capacity", CrudOperator::Gte, 50))
            .sort(CrudSort::asc("title"))
            .sort(CrudSort::desc("createdAt"));

        for encoding in [FilterEncoding::Flat, FilterEncoding::Indexed] {
            let path = encode(&descriptor, encoding);
            let decoded = decode_list_query(&path, encoding).unwrap();
            assert_eq!(decoded.filters, descriptor.filters);
            assert_eq!(decoded.sorters, descriptor.sorters);
        }
    }

    #[test]
    fn flat_keeps_underscore_fields() {
        let decoded =
            decode_list_query("first_name=Ana&created_at_gte=2024", FilterEncoding::Flat).unwrap();
        assert_eq!(
            decoded.filters,
            vec![
                CrudFilter::eq("first_name", "Ana"),
                CrudFilter::new("created_at", CrudOperator::Gte, "2024"),
            ]
        );
        assert_eq!(decoded.pagination, None);
    }

    #[test]
    fn indexed_errors() {
        assert!(decode_list_query("filters[0][value]=x", FilterEncoding::Indexed).is_err());
        assert!(decode_list_query(
            "filters[0][field]=a&filters[0][operator]=like",
            FilterEncoding::Indexed
        )
        .is_err());
        assert!(decode_list_query("current=abc", FilterEncoding::Indexed).is_err());
        assert!(decode_list_query("sort=name", FilterEncoding::Flat).is_err());
    }

    #[test]
    fn indexed_keys() {
        assert_eq!(split_indexed_key("filters[12][value]"), Some(("filters", 12, "value")));
        assert_eq!(split_indexed_key("sorters[x][field]"), None);
        assert_eq!(split_indexed_key("pageSize"), None);
    }
}
