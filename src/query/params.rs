//! Typed filter operands and operators.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{parse_timestamp, DentistField};

/// The accepted comparison operators. Nothing else reaches the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    pub fn parse(token: &str) -> Option<FilterOp> {
        match token {
            "eq" => Some(FilterOp::Eq),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    /// SQL comparison symbol for the scalar operators.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq | FilterOp::In => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
        }
    }

    /// Whether `ordering` (stored value compared to operand) satisfies this operator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq | FilterOp::In => ordering == Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A query-string operand converted to the field's type.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
    Id(Uuid),
}

impl FilterValue {
    pub fn parse(field: DentistField, raw: &str) -> Result<FilterValue, AppError> {
        let raw = raw.trim();
        let invalid = || AppError::Validation(format!("invalid value for {}: {}", field.api_name(), raw));
        Ok(match field {
            DentistField::Id => FilterValue::Id(Uuid::parse_str(raw).map_err(|_| invalid())?),
            DentistField::Name | DentistField::AreaOfExpertise => FilterValue::Text(raw.to_string()),
            DentistField::YearsOfExperience => FilterValue::Int(raw.parse().map_err(|_| invalid())?),
            DentistField::CreatedAt => FilterValue::Timestamp(parse_timestamp(raw).ok_or_else(invalid)?),
        })
    }

    /// Ordering between two operands of the same kind; `None` across kinds.
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Text(a), FilterValue::Text(b)) => Some(a.cmp(b)),
            (FilterValue::Int(a), FilterValue::Int(b)) => Some(a.cmp(b)),
            (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
            (FilterValue::Id(a), FilterValue::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// One predicate on a dentist field. `values` holds exactly one operand except for `In`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    pub field: DentistField,
    pub op: FilterOp,
    pub values: Vec<FilterValue>,
}

impl FieldFilter {
    pub fn compare(field: DentistField, op: FilterOp, value: FilterValue) -> Self {
        FieldFilter {
            field,
            op,
            values: vec![value],
        }
    }

    pub fn one_of(field: DentistField, values: Vec<FilterValue>) -> Self {
        FieldFilter {
            field,
            op: FilterOp::In,
            values,
        }
    }

    /// True when `stored` satisfies the predicate.
    pub fn matches_value(&self, stored: &FilterValue) -> bool {
        self.values
            .iter()
            .any(|operand| stored.compare(operand).map(|o| self.op.accepts(o)).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_are_typed_by_field() {
        assert_eq!(
            FilterValue::parse(DentistField::YearsOfExperience, " 5 ").unwrap(),
            FilterValue::Int(5)
        );
        assert!(FilterValue::parse(DentistField::YearsOfExperience, "five").is_err());
        assert!(FilterValue::parse(DentistField::Id, "not-a-uuid").is_err());
    }

    #[test]
    fn comparison_operators() {
        let f = FieldFilter::compare(DentistField::YearsOfExperience, FilterOp::Gte, FilterValue::Int(5));
        assert!(f.matches_value(&FilterValue::Int(5)));
        assert!(f.matches_value(&FilterValue::Int(9)));
        assert!(!f.matches_value(&FilterValue::Int(4)));
        assert!(!f.matches_value(&FilterValue::Text("5".into())));
    }

    #[test]
    fn empty_in_matches_nothing() {
        let f = FieldFilter::one_of(DentistField::Name, vec![]);
        assert!(!f.matches_value(&FilterValue::Text("x".into())));
    }
}
