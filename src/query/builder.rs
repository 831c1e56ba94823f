//! Turns list query-string parameters into a typed [`ListQuery`].
//!
//! Reserved keys (`select`, `sort`, `page`, `limit`) shape the result set; every
//! other key is a filter on an allow-listed dentist field. Operators are given
//! either in the value (`yearsOfExperience=gte:5`) or in a bracketed key
//! (`yearsOfExperience[gte]=5`).

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::params::{FieldFilter, FilterOp, FilterValue};
use crate::error::AppError;
use crate::model::DentistField;
use crate::response::{PageRef, Pagination};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;
pub const MAX_LIMIT: u64 = 1000;
/// Largest offset PostgreSQL accepts (`bigint`).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

const RESERVED: [&str; 4] = ["select", "sort", "page", "limit"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: DentistField,
    pub descending: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    /// `None` returns every field.
    pub select: Option<Vec<DentistField>>,
    pub sort: Vec<SortKey>,
    pub page: u64,
    pub limit: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filters: Vec::new(),
            select: None,
            sort: default_sort(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn default_sort() -> Vec<SortKey> {
    vec![SortKey {
        field: DentistField::CreatedAt,
        descending: true,
    }]
}

fn bracket_key() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_]+)\[([A-Za-z]+)\]$").ok()).as_ref()
}

fn unknown_field(what: &str, name: &str) -> AppError {
    AppError::Validation(format!("unknown {} field: {}", what, name))
}

/// Split a comma list, trimming whitespace and dropping empty entries.
fn split_list(s: &str) -> impl Iterator<Item = &str> + '_ {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Split `gte:5` into its operator and operand. A prefix that is not an operator token is
/// part of the value (e.g. the hours of a timestamp).
fn split_embedded_op(value: &str) -> (FilterOp, &str) {
    if let Some((token, rest)) = value.split_once(':') {
        if let Some(op) = FilterOp::parse(token) {
            return (op, rest);
        }
    }
    (FilterOp::Eq, value)
}

fn build_filter(field: DentistField, op: FilterOp, raw: &str) -> Result<FieldFilter, AppError> {
    if op == FilterOp::In {
        let values = split_list(raw)
            .map(|v| FilterValue::parse(field, v))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FieldFilter::one_of(field, values));
    }
    Ok(FieldFilter::compare(field, op, FilterValue::parse(field, raw)?))
}

impl ListQuery {
    pub fn from_params(params: &[(String, String)]) -> Result<ListQuery, AppError> {
        let reserved = |key: &str| params.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        let mut filters = Vec::new();
        // Plain `field=value` pairs, grouped so that a repeated key becomes one `in`.
        let mut equalities: Vec<(DentistField, Vec<FilterValue>)> = Vec::new();
        for (key, value) in params {
            if RESERVED.contains(&key.as_str()) {
                continue;
            }
            let (name, op, raw) = match bracket_key().and_then(|re| re.captures(key)) {
                Some(caps) => {
                    let token = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                    let op = FilterOp::parse(token)
                        .ok_or_else(|| AppError::Validation(format!("unknown filter operator: {}", token)))?;
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    (name, op, value.as_str())
                }
                None => {
                    let (op, raw) = split_embedded_op(value);
                    (key.as_str(), op, raw)
                }
            };
            let field = DentistField::parse(name).ok_or_else(|| unknown_field("filter", name))?;
            if op == FilterOp::Eq {
                let v = FilterValue::parse(field, raw)?;
                match equalities.iter().position(|(f, _)| *f == field) {
                    Some(i) => equalities[i].1.push(v),
                    None => equalities.push((field, vec![v])),
                }
            } else {
                filters.push(build_filter(field, op, raw)?);
            }
        }
        for (field, mut values) in equalities {
            if values.len() == 1 {
                filters.push(FieldFilter::compare(field, FilterOp::Eq, values.remove(0)));
            } else {
                filters.push(FieldFilter::one_of(field, values));
            }
        }

        let select = match reserved("select") {
            Some(s) => {
                let fields = split_list(s)
                    .map(|name| DentistField::parse(name).ok_or_else(|| unknown_field("select", name)))
                    .collect::<Result<Vec<_>, _>>()?;
                if fields.is_empty() {
                    None
                } else {
                    Some(fields)
                }
            }
            None => None,
        };

        let mut sort = Vec::new();
        if let Some(s) = reserved("sort") {
            for part in split_list(s) {
                let (name, descending) = match part.strip_prefix('-') {
                    Some(rest) => (rest, true),
                    None => (part.strip_prefix('+').unwrap_or(part), false),
                };
                let field = DentistField::parse(name).ok_or_else(|| unknown_field("sort", name))?;
                if field.is_list() {
                    return Err(AppError::Validation(format!("cannot sort by list field: {}", name)));
                }
                sort.push(SortKey { field, descending });
            }
        }
        if sort.is_empty() {
            sort = default_sort();
        }

        Ok(ListQuery {
            filters,
            select,
            sort,
            page: parse_positive(reserved("page"), DEFAULT_PAGE),
            limit: parse_positive(reserved("limit"), DEFAULT_LIMIT).min(MAX_LIMIT),
        })
    }

    /// Number of records before the requested page, capped at what a SQL `OFFSET` accepts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_OFFSET)
    }

    /// Neighbouring pages given the total number of matching records.
    pub fn pagination(&self, total: u64) -> Pagination {
        let end = self.page.saturating_mul(self.limit);
        Pagination {
            next: (end < total).then(|| PageRef {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.skip() > 0).then(|| PageRef {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }

    /// Drop fields not named by `select`. `id` and populated relations always stay.
    pub fn project(&self, record: &mut Map<String, Value>) {
        let Some(fields) = &self.select else { return };
        let keep: Vec<&str> = fields.iter().map(|f| f.api_name()).collect();
        record.retain(|k, _| {
            k == DentistField::Id.api_name()
                || keep.contains(&k.as_str())
                || DentistField::ALL.iter().all(|f| f.api_name() != k)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_empty() {
        let q = ListQuery::from_params(&[]).unwrap();
        assert_eq!(q, ListQuery::default());
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn embedded_and_bracketed_operators() {
        let q = ListQuery::from_params(&pairs(&[
            ("yearsOfExperience", "gte:5"),
            ("yearsOfExperience[lt]", "20"),
        ]))
        .unwrap();
        assert_eq!(
            q.filters,
            vec![
                FieldFilter::compare(DentistField::YearsOfExperience, FilterOp::Gte, FilterValue::Int(5)),
                FieldFilter::compare(DentistField::YearsOfExperience, FilterOp::Lt, FilterValue::Int(20)),
            ]
        );
    }

    #[test]
    fn in_lists_and_repeated_keys() {
        let q = ListQuery::from_params(&pairs(&[
            ("areaOfExpertise", "in:orthodontics, endodontics"),
            ("name", "Dr. A"),
            ("name", "Dr. B"),
        ]))
        .unwrap();
        assert_eq!(
            q.filters,
            vec![
                FieldFilter::one_of(
                    DentistField::AreaOfExpertise,
                    vec![
                        FilterValue::Text("orthodontics".into()),
                        FilterValue::Text("endodontics".into())
                    ]
                ),
                FieldFilter::one_of(
                    DentistField::Name,
                    vec![FilterValue::Text("Dr. A".into()), FilterValue::Text("Dr. B".into())]
                ),
            ]
        );
    }

    #[test]
    fn timestamps_with_colons_stay_equalities() {
        let q = ListQuery::from_params(&pairs(&[("createdAt", "2026-01-01T10:00:00Z")])).unwrap();
        assert_eq!(q.filters[0].op, FilterOp::Eq);
    }

    #[test]
    fn unknown_fields_and_operators_are_rejected() {
        assert!(ListQuery::from_params(&pairs(&[("password", "x")])).is_err());
        assert!(ListQuery::from_params(&pairs(&[("name[regex]", ".*")])).is_err());
        assert!(ListQuery::from_params(&pairs(&[("sort", "-salary")])).is_err());
        assert!(ListQuery::from_params(&pairs(&[("select", "name,$where")])).is_err());
    }

    #[test]
    fn list_fields_cannot_be_sort_keys() {
        let err = ListQuery::from_params(&pairs(&[("sort", "-areaOfExpertise")])).unwrap_err();
        assert_eq!(err.to_string(), "cannot sort by list field: areaOfExpertise");
    }

    #[test]
    fn huge_pages_clamp_the_offset() {
        let q = ListQuery::from_params(&pairs(&[("page", "400000000000000000")])).unwrap();
        assert_eq!(q.skip(), MAX_OFFSET);
    }

    #[test]
    fn select_sort_and_paging() {
        let q = ListQuery::from_params(&pairs(&[
            ("select", " name , yearsOfExperience,"),
            ("sort", "name,-yearsOfExperience"),
            ("page", "3"),
            ("limit", "10"),
        ]))
        .unwrap();
        assert_eq!(q.select, Some(vec![DentistField::Name, DentistField::YearsOfExperience]));
        assert_eq!(
            q.sort,
            vec![
                SortKey { field: DentistField::Name, descending: false },
                SortKey { field: DentistField::YearsOfExperience, descending: true },
            ]
        );
        assert_eq!(q.skip(), 20);
    }

    #[test]
    fn bad_paging_falls_back_and_limit_is_capped() {
        let q = ListQuery::from_params(&pairs(&[("page", "0"), ("limit", "abc")])).unwrap();
        assert_eq!((q.page, q.limit), (1, 25));
        let q = ListQuery::from_params(&pairs(&[("limit", "50000")])).unwrap();
        assert_eq!(q.limit, MAX_LIMIT);
    }

    #[test]
    fn pagination_links() {
        let q = ListQuery::from_params(&pairs(&[("page", "2"), ("limit", "10")])).unwrap();
        let p = q.pagination(15);
        assert_eq!(p.next, None);
        assert_eq!(p.prev, Some(PageRef { page: 1, limit: 10 }));

        let q = ListQuery::from_params(&pairs(&[("limit", "10")])).unwrap();
        let p = q.pagination(15);
        assert_eq!(p.next, Some(PageRef { page: 2, limit: 10 }));
        assert_eq!(p.prev, None);
    }

    #[test]
    fn projection_keeps_id_and_relations() {
        let q = ListQuery::from_params(&pairs(&[("select", "name")])).unwrap();
        let mut rec = json!({
            "id": "x", "name": "n", "yearsOfExperience": 3,
            "areaOfExpertise": ["a"], "createdAt": "t", "bookings": []
        });
        q.project(rec.as_object_mut().unwrap());
        assert_eq!(rec, json!({"id": "x", "name": "n", "bookings": []}));
    }
}
