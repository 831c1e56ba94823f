//! Filter and sort evaluation over in-memory dentist records.

use std::cmp::Ordering;

use crate::model::{Dentist, DentistField};
use crate::query::{FieldFilter, FilterValue, SortKey};

/// The comparable values of one field. List fields yield one value per element.
pub(crate) fn field_values(dentist: &Dentist, field: DentistField) -> Vec<FilterValue> {
    match field {
        DentistField::Id => vec![FilterValue::Id(dentist.id)],
        DentistField::Name => vec![FilterValue::Text(dentist.name.clone())],
        DentistField::YearsOfExperience => vec![FilterValue::Int(dentist.years_of_experience)],
        DentistField::AreaOfExpertise => dentist
            .area_of_expertise
            .iter()
            .map(|a| FilterValue::Text(a.clone()))
            .collect(),
        DentistField::CreatedAt => vec![FilterValue::Timestamp(dentist.created_at)],
    }
}

/// All filters hold; a list field satisfies a filter when any element does.
pub(crate) fn matches(dentist: &Dentist, filters: &[FieldFilter]) -> bool {
    filters.iter().all(|filter| {
        field_values(dentist, filter.field)
            .iter()
            .any(|stored| filter.matches_value(stored))
    })
}

/// Sort keys are scalar fields only; the query parser rejects list fields.
fn sort_value(dentist: &Dentist, key: &SortKey) -> Option<FilterValue> {
    field_values(dentist, key.field).into_iter().next()
}

/// Order by each sort key in turn, then by id for a stable result.
pub(crate) fn compare(a: &Dentist, b: &Dentist, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = match (sort_value(a, key), sort_value(b, key)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = if key.descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id.cmp(&b.id)
}
