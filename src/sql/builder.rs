//! Builds parameterized dentist list/count queries from a [`ListQuery`].
//! Identifiers come only from the [`DentistField`] allow-list; operands are always parameters.

use crate::model::DentistField;
use crate::query::{FieldFilter, FilterOp, ListQuery};
use crate::sql::PgBindValue;

pub const DENTISTS_TABLE: &str = "dentists";
pub const BOOKINGS_TABLE: &str = "bookings";

pub const DENTIST_COLUMNS: &str = "\"id\", \"name\", \"years_of_experience\", \"area_of_expertise\", \"created_at\"";
pub const BOOKING_COLUMNS: &str = "\"id\", \"book_date\", \"user_id\", \"dentist_id\", \"exclusive\", \"created_at\"";

/// Quote identifier for PostgreSQL (safe: only from the allow-list).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// PostgreSQL element type of a field, used to cast placeholders.
fn pg_type(field: DentistField) -> &'static str {
    match field {
        DentistField::Id => "uuid",
        DentistField::Name | DentistField::AreaOfExpertise => "text",
        DentistField::YearsOfExperience => "bigint",
        DentistField::CreatedAt => "timestamptz",
    }
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

fn predicate(q: &mut QueryBuf, filter: &FieldFilter) -> String {
    let col = quoted(filter.field.column());
    let ty = pg_type(filter.field);
    if filter.op == FilterOp::In {
        let n = q.push_param(PgBindValue::array_from_filters(&filter.values));
        return if filter.field.is_list() {
            format!("{} && ${}::{}[]", col, n, ty)
        } else {
            format!("{} = ANY(${}::{}[])", col, n, ty)
        };
    }
    let Some(value) = filter.values.first() else {
        return "FALSE".into();
    };
    let n = q.push_param(PgBindValue::from_filter(value));
    let sym = filter.op.sql_symbol();
    if filter.field.is_list() {
        if filter.op == FilterOp::Eq {
            format!("${}::{} = ANY({})", n, ty, col)
        } else {
            format!("EXISTS (SELECT 1 FROM unnest({}) AS e WHERE e {} ${}::{})", col, sym, n, ty)
        }
    } else {
        format!("{} {} ${}::{}", col, sym, n, ty)
    }
}

fn where_clause(q: &mut QueryBuf, filters: &[FieldFilter]) -> String {
    let parts: Vec<String> = filters.iter().map(|f| predicate(q, f)).collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT page of dentists: filters ANDed, ORDER BY sort keys then id, LIMIT/OFFSET from paging.
pub fn select_dentists(query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, &query.filters);
    let mut order: Vec<String> = query
        .sort
        .iter()
        .map(|k| {
            // Byte-order collation for text so every backend sorts names alike.
            let collate = if pg_type(k.field) == "text" { " COLLATE \"C\"" } else { "" };
            let dir = if k.descending { "DESC" } else { "ASC" };
            format!("{}{} {}", quoted(k.field.column()), collate, dir)
        })
        .collect();
    if !query.sort.iter().any(|k| k.field == DentistField::Id) {
        order.push(format!("{} ASC", quoted(DentistField::Id.column())));
    }
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        DENTIST_COLUMNS,
        quoted(DENTISTS_TABLE),
        where_sql,
        order.join(", "),
        query.limit,
        query.skip()
    );
    q
}

/// COUNT of dentists matching the filters, ignoring paging.
pub fn count_dentists(filters: &[FieldFilter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(DENTISTS_TABLE), where_sql);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterValue;

    fn query(params: &[(&str, &str)]) -> ListQuery {
        let pairs: Vec<(String, String)> = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ListQuery::from_params(&pairs).unwrap()
    }

    #[test]
    fn default_listing() {
        let q = select_dentists(&ListQuery::default());
        assert_eq!(
            q.sql,
            format!(
                "SELECT {} FROM \"dentists\" ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 25 OFFSET 0",
                DENTIST_COLUMNS
            )
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn filters_become_numbered_parameters() {
        let q = select_dentists(&query(&[
            ("yearsOfExperience", "gte:5"),
            ("areaOfExpertise", "orthodontics"),
            ("page", "2"),
            ("limit", "10"),
            ("sort", "name"),
        ]));
        assert_eq!(
            q.sql,
            format!(
                "SELECT {} FROM \"dentists\" WHERE \"years_of_experience\" >= $1::bigint AND $2::text = ANY(\"area_of_expertise\") ORDER BY \"name\" COLLATE \"C\" ASC, \"id\" ASC LIMIT 10 OFFSET 10",
                DENTIST_COLUMNS
            )
        );
        assert_eq!(
            q.params,
            vec![PgBindValue::I64(5), PgBindValue::Text("orthodontics".into())]
        );
    }

    #[test]
    fn huge_page_offset_stays_within_bigint() {
        let q = select_dentists(&query(&[("page", "400000000000000000"), ("limit", "25")]));
        let offset = q.sql.rsplit("OFFSET ").next().unwrap();
        assert_eq!(offset.parse::<i64>().unwrap(), i64::MAX);
        let limit = q.sql.split("LIMIT ").nth(1).unwrap().split(' ').next().unwrap();
        assert_eq!(limit.parse::<i64>().unwrap(), 25);
    }

    #[test]
    fn in_lists_bind_one_array() {
        let q = count_dentists(&[
            FieldFilter::one_of(DentistField::Name, vec![FilterValue::Text("a".into()), FilterValue::Text("b".into())]),
            FieldFilter::one_of(DentistField::AreaOfExpertise, vec![FilterValue::Text("x".into())]),
        ]);
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM \"dentists\" WHERE \"name\" = ANY($1::text[]) AND \"area_of_expertise\" && $2::text[]"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn list_field_comparison_uses_unnest() {
        let q = count_dentists(&[FieldFilter::compare(
            DentistField::AreaOfExpertise,
            FilterOp::Gt,
            FilterValue::Text("m".into()),
        )]);
        assert!(q.sql.ends_with("WHERE EXISTS (SELECT 1 FROM unnest(\"area_of_expertise\") AS e WHERE e > $1::text)"));
    }
}
