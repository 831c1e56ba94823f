//! Convert filter operands to values that sqlx can bind.

use chrono::{DateTime, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};
use uuid::Uuid;

use crate::query::FilterValue;

/// A value bound to a PostgreSQL placeholder. Arrays back `= ANY(...)` and `&&`.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Text(String),
    I64(i64),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    TextArray(Vec<String>),
    I64Array(Vec<i64>),
    TimestampArray(Vec<DateTime<Utc>>),
    UuidArray(Vec<Uuid>),
}

impl PgBindValue {
    pub fn from_filter(v: &FilterValue) -> Self {
        match v {
            FilterValue::Text(s) => PgBindValue::Text(s.clone()),
            FilterValue::Int(n) => PgBindValue::I64(*n),
            FilterValue::Timestamp(t) => PgBindValue::Timestamp(*t),
            FilterValue::Id(u) => PgBindValue::Uuid(*u),
        }
    }

    /// One array parameter from same-kind operands. An empty list binds as an empty text array.
    pub fn array_from_filters(values: &[FilterValue]) -> Self {
        match values.first() {
            Some(FilterValue::Int(_)) => {
                PgBindValue::I64Array(values.iter().filter_map(|v| match v {
                    FilterValue::Int(n) => Some(*n),
                    _ => None,
                }).collect())
            }
            Some(FilterValue::Timestamp(_)) => {
                PgBindValue::TimestampArray(values.iter().filter_map(|v| match v {
                    FilterValue::Timestamp(t) => Some(*t),
                    _ => None,
                }).collect())
            }
            Some(FilterValue::Id(_)) => {
                PgBindValue::UuidArray(values.iter().filter_map(|v| match v {
                    FilterValue::Id(u) => Some(*u),
                    _ => None,
                }).collect())
            }
            Some(FilterValue::Text(_)) | None => {
                PgBindValue::TextArray(values.iter().filter_map(|v| match v {
                    FilterValue::Text(s) => Some(s.clone()),
                    _ => None,
                }).collect())
            }
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::Timestamp(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf),
            PgBindValue::Uuid(u) => <Uuid as Encode<Postgres>>::encode_by_ref(u, buf),
            PgBindValue::TextArray(v) => <Vec<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::I64Array(v) => <Vec<i64> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::TimestampArray(v) => <Vec<DateTime<Utc>> as Encode<Postgres>>::encode_by_ref(v, buf),
            PgBindValue::UuidArray(v) => <Vec<Uuid> as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Text(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::Timestamp(_) => <DateTime<Utc> as Type<Postgres>>::type_info(),
            PgBindValue::Uuid(_) => <Uuid as Type<Postgres>>::type_info(),
            PgBindValue::TextArray(_) => <Vec<String> as Type<Postgres>>::type_info(),
            PgBindValue::I64Array(_) => <Vec<i64> as Type<Postgres>>::type_info(),
            PgBindValue::TimestampArray(_) => <Vec<DateTime<Utc>> as Type<Postgres>>::type_info(),
            PgBindValue::UuidArray(_) => <Vec<Uuid> as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
