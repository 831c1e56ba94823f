//! Dentist record, its inputs, and the allow-list of queryable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dentist {
    pub id: Uuid,
    pub name: String,
    pub years_of_experience: i64,
    pub area_of_expertise: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Create payload after schema validation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDentist {
    pub name: String,
    pub years_of_experience: i64,
    pub area_of_expertise: Vec<String>,
}

impl NewDentist {
    pub fn into_dentist(self) -> Dentist {
        Dentist {
            id: Uuid::new_v4(),
            name: self.name,
            years_of_experience: self.years_of_experience,
            area_of_expertise: self.area_of_expertise,
            created_at: Utc::now(),
        }
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DentistPatch {
    pub name: Option<String>,
    pub years_of_experience: Option<i64>,
    pub area_of_expertise: Option<Vec<String>>,
}

impl DentistPatch {
    pub fn apply(self, dentist: &mut Dentist) {
        if let Some(name) = self.name {
            dentist.name = name;
        }
        if let Some(years) = self.years_of_experience {
            dentist.years_of_experience = years;
        }
        if let Some(areas) = self.area_of_expertise {
            dentist.area_of_expertise = areas;
        }
    }
}

/// Dentist fields that may be filtered, selected, or sorted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DentistField {
    Id,
    Name,
    YearsOfExperience,
    AreaOfExpertise,
    CreatedAt,
}

impl DentistField {
    pub const ALL: [DentistField; 5] = [
        DentistField::Id,
        DentistField::Name,
        DentistField::YearsOfExperience,
        DentistField::AreaOfExpertise,
        DentistField::CreatedAt,
    ];

    /// Accepts the JSON name; `_id` is an alias for `id`.
    pub fn parse(s: &str) -> Option<DentistField> {
        match s {
            "id" | "_id" => Some(DentistField::Id),
            "name" => Some(DentistField::Name),
            "yearsOfExperience" => Some(DentistField::YearsOfExperience),
            "areaOfExpertise" => Some(DentistField::AreaOfExpertise),
            "createdAt" => Some(DentistField::CreatedAt),
            _ => None,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            DentistField::Id => "id",
            DentistField::Name => "name",
            DentistField::YearsOfExperience => "yearsOfExperience",
            DentistField::AreaOfExpertise => "areaOfExpertise",
            DentistField::CreatedAt => "createdAt",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            DentistField::Id => "id",
            DentistField::Name => "name",
            DentistField::YearsOfExperience => "years_of_experience",
            DentistField::AreaOfExpertise => "area_of_expertise",
            DentistField::CreatedAt => "created_at",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DentistField::AreaOfExpertise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for f in DentistField::ALL {
            assert_eq!(DentistField::parse(f.api_name()), Some(f));
        }
        assert_eq!(DentistField::parse("_id"), Some(DentistField::Id));
        assert_eq!(DentistField::parse("$where"), None);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut d = NewDentist {
            name: "Dr. Lee".into(),
            years_of_experience: 4,
            area_of_expertise: vec!["orthodontics".into()],
        }
        .into_dentist();
        DentistPatch {
            years_of_experience: Some(5),
            ..Default::default()
        }
        .apply(&mut d);
        assert_eq!(d.name, "Dr. Lee");
        assert_eq!(d.years_of_experience, 5);
    }
}
