//! Idempotent DDL for the dentists and bookings tables and their uniqueness indexes.

use crate::error::AppError;
use sqlx::PgPool;

/// One booking per (dentist, date).
pub const DENTIST_DATE_INDEX: &str = "bookings_dentist_date_key";
/// One exclusive booking per user. Bookings made by admins are not exclusive.
pub const USER_EXCLUSIVE_INDEX: &str = "bookings_user_exclusive_idx";

const DENTISTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS dentists (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    years_of_experience BIGINT NOT NULL,
    area_of_expertise TEXT[] NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const BOOKINGS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS bookings (
    id UUID PRIMARY KEY,
    book_date TIMESTAMPTZ NOT NULL,
    user_id TEXT NOT NULL,
    dentist_id UUID NOT NULL,
    exclusive BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Statements run at startup, in order. Each one is safe to repeat.
/// The user index is created first so a racing insert that breaks both rules reports the user rule.
pub fn statements() -> Vec<String> {
    vec![
        DENTISTS_DDL.trim().to_string(),
        BOOKINGS_DDL.trim().to_string(),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON bookings (user_id) WHERE exclusive",
            USER_EXCLUSIVE_INDEX
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON bookings (dentist_id, book_date)",
            DENTIST_DATE_INDEX
        ),
        "CREATE INDEX IF NOT EXISTS bookings_user_idx ON bookings (user_id)".to_string(),
    ]
}

pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for sql in statements() {
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!("schema up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_repeatable() {
        for sql in statements() {
            assert!(sql.contains("IF NOT EXISTS"), "{}", sql);
        }
    }

    #[test]
    fn user_index_only_covers_exclusive_bookings() {
        let s = statements();
        assert!(s.iter().any(|q| q.contains(USER_EXCLUSIVE_INDEX) && q.ends_with("WHERE exclusive")));
    }

    #[test]
    fn user_index_precedes_schedule_index() {
        let s = statements();
        let pos = |name: &str| s.iter().position(|q| q.contains(name)).unwrap();
        assert!(pos(USER_EXCLUSIVE_INDEX) < pos(DENTIST_DATE_INDEX));
    }
}
