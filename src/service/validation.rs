//! Request validation from schema rules.

use crate::error::AppError;
use crate::model::{parse_timestamp, FieldKind, ValidationRule};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate and normalize a body against every rule. All required fields must be present.
    pub fn validate(body: &mut Map<String, Value>, rules: &[ValidationRule]) -> Result<(), AppError> {
        for rule in rules {
            let present = matches!(body.get(rule.field), Some(v) if !v.is_null());
            if !present {
                if let Some(message) = rule.required {
                    return Err(AppError::Validation(message.into()));
                }
                body.remove(rule.field);
                continue;
            }
            if let Some(v) = body.get_mut(rule.field) {
                validate_field(rule, v)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for PUT). A required field may not be cleared.
    pub fn validate_partial(body: &mut Map<String, Value>, rules: &[ValidationRule]) -> Result<(), AppError> {
        for rule in rules {
            match body.get(rule.field) {
                None => continue,
                Some(Value::Null) => {
                    if let Some(message) = rule.required {
                        return Err(AppError::Validation(message.into()));
                    }
                    body.remove(rule.field);
                    continue;
                }
                Some(_) => {}
            }
            if let Some(v) = body.get_mut(rule.field) {
                validate_field(rule, v)?;
            }
        }
        Ok(())
    }

    /// Validate, then deserialize into the typed input.
    pub fn parse<T: DeserializeOwned>(body: Value, rules: &[ValidationRule], partial: bool) -> Result<T, AppError> {
        let mut map = body_to_map(body)?;
        if partial {
            Self::validate_partial(&mut map, rules)?;
        } else {
            Self::validate(&mut map, rules)?;
        }
        serde_json::from_value(Value::Object(map)).map_err(|e| AppError::Validation(e.to_string()))
    }
}

pub fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn type_error(rule: &ValidationRule, expected: &str) -> AppError {
    AppError::Validation(format!("{} must be {}", rule.field, expected))
}

fn validate_field(rule: &ValidationRule, v: &mut Value) -> Result<(), AppError> {
    match rule.kind {
        FieldKind::Text => {
            let s = v.as_str().ok_or_else(|| type_error(rule, "a string"))?.trim().to_string();
            if s.is_empty() {
                if let Some(message) = rule.required {
                    return Err(AppError::Validation(message.into()));
                }
            }
            if let Some((max, message)) = rule.max_length {
                if s.chars().count() > max {
                    return Err(AppError::Validation(message.into()));
                }
            }
            *v = Value::String(s);
        }
        FieldKind::Integer => {
            let n = match &*v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| type_error(rule, "an integer"))?;
            if let Some((min, message)) = rule.minimum {
                if n < min {
                    return Err(AppError::Validation(message.into()));
                }
            }
            *v = Value::Number(n.into());
        }
        FieldKind::TextList => {
            let items: Vec<Value> = match &*v {
                Value::Array(arr) => arr.clone(),
                // A single string is accepted as a one-element list.
                Value::String(_) => vec![v.clone()],
                _ => return Err(type_error(rule, "a list of strings")),
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().ok_or_else(|| type_error(rule, "a list of strings"))?;
                out.push(Value::String(s.trim().to_string()));
            }
            if let Some((min, message)) = rule.min_items {
                if out.len() < min {
                    return Err(AppError::Validation(message.into()));
                }
            }
            *v = Value::Array(out);
        }
        FieldKind::Timestamp => {
            let ts = v
                .as_str()
                .and_then(parse_timestamp)
                .ok_or_else(|| type_error(rule, "a valid date"))?;
            *v = Value::String(ts.to_rfc3339());
        }
        FieldKind::Id => {
            let s = v.as_str().ok_or_else(|| type_error(rule, "a valid id"))?;
            uuid::Uuid::parse_str(s.trim()).map_err(|_| type_error(rule, "a valid id"))?;
            *v = Value::String(s.trim().to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookingInput, DentistPatch, NewDentist, BOOKING_SCHEMA, DENTIST_SCHEMA};
    use serde_json::json;

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn dentist_body_is_normalized() {
        let d: NewDentist = RequestValidator::parse(
            json!({"name": "  Dr. Sato ", "yearsOfExperience": "7", "areaOfExpertise": "endodontics"}),
            DENTIST_SCHEMA,
            false,
        )
        .unwrap();
        assert_eq!(d.name, "Dr. Sato");
        assert_eq!(d.years_of_experience, 7);
        assert_eq!(d.area_of_expertise, vec!["endodontics"]);
    }

    #[test]
    fn missing_and_oversized_fields_are_rejected() {
        let err = RequestValidator::parse::<NewDentist>(
            json!({"yearsOfExperience": 1, "areaOfExpertise": ["x"]}),
            DENTIST_SCHEMA,
            false,
        )
        .unwrap_err();
        assert_eq!(message(err), "Please add a name");

        let err = RequestValidator::parse::<NewDentist>(
            json!({"name": "a".repeat(101), "yearsOfExperience": 1, "areaOfExpertise": ["x"]}),
            DENTIST_SCHEMA,
            false,
        )
        .unwrap_err();
        assert_eq!(message(err), "Name can not be more than 100 characters");

        let err = RequestValidator::parse::<NewDentist>(
            json!({"name": "n", "yearsOfExperience": 1, "areaOfExpertise": []}),
            DENTIST_SCHEMA,
            false,
        )
        .unwrap_err();
        assert_eq!(message(err), "Please add at least one area of expertise");
    }

    #[test]
    fn partial_update_checks_only_present_fields() {
        let p: DentistPatch =
            RequestValidator::parse(json!({"yearsOfExperience": 12}), DENTIST_SCHEMA, true).unwrap();
        assert_eq!(p.years_of_experience, Some(12));
        assert!(p.name.is_none());

        let err = RequestValidator::parse::<DentistPatch>(json!({"name": null}), DENTIST_SCHEMA, true).unwrap_err();
        assert_eq!(message(err), "Please add a name");
    }

    #[test]
    fn book_date_accepts_plain_dates() {
        let b: BookingInput = RequestValidator::parse(json!({"bookDate": "2026-05-04"}), BOOKING_SCHEMA, false).unwrap();
        assert_eq!(b.book_date.to_rfc3339(), "2026-05-04T00:00:00+00:00");

        let err = RequestValidator::parse::<BookingInput>(json!({}), BOOKING_SCHEMA, false).unwrap_err();
        assert_eq!(message(err), "Please add a date for the booking");
    }

    #[test]
    fn non_object_body_is_bad_request() {
        let err = RequestValidator::parse::<BookingInput>(json!([1]), BOOKING_SCHEMA, false).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
