//! Field-level validation rules for request bodies, one table per entity.

/// Expected JSON shape of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// String; surrounding whitespace is trimmed before checks.
    Text,
    /// Integer; numeric strings are accepted and converted.
    Integer,
    /// Array of strings.
    TextList,
    /// Date or date-time string, normalized to RFC 3339.
    Timestamp,
    /// UUID string.
    Id,
}

#[derive(Clone, Copy, Debug)]
pub struct ValidationRule {
    pub field: &'static str,
    pub kind: FieldKind,
    /// Message when the field is missing or null. `None` means optional.
    pub required: Option<&'static str>,
    pub max_length: Option<(usize, &'static str)>,
    pub min_items: Option<(usize, &'static str)>,
    pub minimum: Option<(i64, &'static str)>,
}

impl ValidationRule {
    const fn new(field: &'static str, kind: FieldKind) -> Self {
        ValidationRule {
            field,
            kind,
            required: None,
            max_length: None,
            min_items: None,
            minimum: None,
        }
    }

    const fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    const fn max_length(mut self, max: usize, message: &'static str) -> Self {
        self.max_length = Some((max, message));
        self
    }

    const fn min_items(mut self, min: usize, message: &'static str) -> Self {
        self.min_items = Some((min, message));
        self
    }

    const fn minimum(mut self, min: i64, message: &'static str) -> Self {
        self.minimum = Some((min, message));
        self
    }
}

pub const DENTIST_SCHEMA: &[ValidationRule] = &[
    ValidationRule::new("name", FieldKind::Text)
        .required("Please add a name")
        .max_length(100, "Name can not be more than 100 characters"),
    ValidationRule::new("yearsOfExperience", FieldKind::Integer)
        .required("Please add years of experience")
        .minimum(0, "Years of experience can not be negative"),
    ValidationRule::new("areaOfExpertise", FieldKind::TextList)
        .required("Please add at least one area of expertise")
        .min_items(1, "Please add at least one area of expertise"),
];

pub const BOOKING_SCHEMA: &[ValidationRule] = &[
    ValidationRule::new("bookDate", FieldKind::Timestamp).required("Please add a date for the booking"),
    ValidationRule::new("dentist", FieldKind::Id),
];
