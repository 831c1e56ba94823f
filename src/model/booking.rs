//! Booking record and its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Dentist;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub book_date: DateTime<Utc>,
    #[sqlx(rename = "user_id")]
    pub user: String,
    #[sqlx(rename = "dentist_id")]
    pub dentist: Uuid,
    /// Made under the one-booking-per-user rule (creator was not an admin).
    #[serde(skip)]
    pub exclusive: bool,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied part of a new booking.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub book_date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewBooking {
    pub book_date: DateTime<Utc>,
    pub user: String,
    pub dentist: Uuid,
    pub exclusive: bool,
}

impl NewBooking {
    pub fn into_booking(self) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            book_date: self.book_date,
            user: self.user,
            dentist: self.dentist,
            exclusive: self.exclusive,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    pub book_date: Option<DateTime<Utc>>,
    pub dentist: Option<Uuid>,
}

impl BookingPatch {
    pub fn apply(self, booking: &mut Booking) {
        if let Some(date) = self.book_date {
            booking.book_date = date;
        }
        if let Some(dentist) = self.dentist {
            booking.dentist = dentist;
        }
    }
}

/// Which bookings a list request may see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingScope {
    All,
    ForUser(String),
    ForDentist(Uuid),
}

impl BookingScope {
    pub fn admits(&self, booking: &Booking) -> bool {
        match self {
            BookingScope::All => true,
            BookingScope::ForUser(user) => booking.user == *user,
            BookingScope::ForDentist(dentist) => booking.dentist == *dentist,
        }
    }
}

/// The dentist fields shown inside a booking.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DentistSummary {
    pub id: Uuid,
    pub name: String,
    pub years_of_experience: i64,
    pub area_of_expertise: Vec<String>,
}

impl From<&Dentist> for DentistSummary {
    fn from(d: &Dentist) -> Self {
        DentistSummary {
            id: d.id,
            name: d.name.clone(),
            years_of_experience: d.years_of_experience,
            area_of_expertise: d.area_of_expertise.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DentistRef {
    Populated(DentistSummary),
    Id(Uuid),
}

/// Booking as returned by the API, with its dentist populated when it still exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub book_date: DateTime<Utc>,
    pub user: String,
    pub dentist: DentistRef,
    pub created_at: DateTime<Utc>,
}

impl BookingView {
    pub fn new(booking: Booking, dentist: Option<&Dentist>) -> Self {
        let dentist = match dentist {
            Some(d) => DentistRef::Populated(d.into()),
            None => DentistRef::Id(booking.dentist),
        };
        BookingView {
            id: booking.id,
            book_date: booking.book_date,
            user: booking.user,
            dentist,
            created_at: booking.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_flag_is_not_serialized() {
        let b = NewBooking {
            book_date: Utc::now(),
            user: "u1".into(),
            dentist: Uuid::new_v4(),
            exclusive: true,
        }
        .into_booking();
        let v = serde_json::to_value(&b).unwrap();
        assert!(v.get("exclusive").is_none());
        assert_eq!(v["user"], "u1");
    }

    #[test]
    fn view_falls_back_to_dentist_id() {
        let dentist = Uuid::new_v4();
        let b = NewBooking {
            book_date: Utc::now(),
            user: "u1".into(),
            dentist,
            exclusive: false,
        }
        .into_booking();
        let v = serde_json::to_value(BookingView::new(b, None)).unwrap();
        assert_eq!(v["dentist"], serde_json::json!(dentist));
    }
}
