//! PostgreSQL backend. Uniqueness of bookings is enforced by unique indexes
//! (see [`crate::migration`]); a violation surfaces as SQLSTATE 23505 and is mapped
//! back to the rule it broke.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::EntityStore;
use crate::error::{AppError, ConfigError, UniqueViolation};
use crate::migration::{DENTIST_DATE_INDEX, USER_EXCLUSIVE_INDEX};
use crate::model::{Booking, BookingPatch, BookingScope, Dentist, DentistPatch, NewBooking, NewDentist};
use crate::query::{FieldFilter, ListQuery};
use crate::sql::{self, BOOKINGS_TABLE, BOOKING_COLUMNS, DENTISTS_TABLE, DENTIST_COLUMNS};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-index violation to the booking rule behind it; other errors pass through.
fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(USER_EXCLUSIVE_INDEX) => return AppError::Duplicate(UniqueViolation::UserBooking),
                Some(DENTIST_DATE_INDEX) => return AppError::Duplicate(UniqueViolation::DentistSchedule),
                _ => {}
            }
        }
    }
    AppError::Db(err)
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }

    async fn find_dentists(&self, query: &ListQuery) -> Result<Vec<Dentist>, AppError> {
        let q = sql::select_dentists(query);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "select dentists");
        let mut stmt = sqlx::query_as::<_, Dentist>(&q.sql);
        for p in q.params {
            stmt = stmt.bind(p);
        }
        Ok(stmt.fetch_all(&self.pool).await?)
    }

    async fn count_dentists(&self, filters: &[FieldFilter]) -> Result<u64, AppError> {
        let q = sql::count_dentists(filters);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "count dentists");
        let mut stmt = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in q.params {
            stmt = stmt.bind(p);
        }
        let n = stmt.fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn get_dentist(&self, id: Uuid) -> Result<Option<Dentist>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", DENTIST_COLUMNS, DENTISTS_TABLE);
        Ok(sqlx::query_as::<_, Dentist>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_dentists(&self, ids: &[Uuid]) -> Result<Vec<Dentist>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM {} WHERE id = ANY($1)", DENTIST_COLUMNS, DENTISTS_TABLE);
        Ok(sqlx::query_as::<_, Dentist>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_dentist(&self, new: NewDentist) -> Result<Dentist, AppError> {
        let d = new.into_dentist();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            DENTISTS_TABLE, DENTIST_COLUMNS, DENTIST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Dentist>(&sql)
            .bind(d.id)
            .bind(&d.name)
            .bind(d.years_of_experience)
            .bind(&d.area_of_expertise)
            .bind(d.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_dentist(&self, id: Uuid, patch: DentistPatch) -> Result<Option<Dentist>, AppError> {
        let sql = format!(
            "UPDATE {} SET name = COALESCE($2, name), \
             years_of_experience = COALESCE($3, years_of_experience), \
             area_of_expertise = COALESCE($4, area_of_expertise) \
             WHERE id = $1 RETURNING {}",
            DENTISTS_TABLE, DENTIST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Dentist>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.years_of_experience)
            .bind(patch.area_of_expertise)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_dentist(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", DENTISTS_TABLE);
        let r = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn find_bookings(&self, scope: &BookingScope) -> Result<Vec<Booking>, AppError> {
        let base = format!("SELECT {} FROM {}", BOOKING_COLUMNS, BOOKINGS_TABLE);
        let order = "ORDER BY book_date ASC, id ASC";
        let rows = match scope {
            BookingScope::All => {
                sqlx::query_as::<_, Booking>(&format!("{} {}", base, order))
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::ForUser(user) => {
                sqlx::query_as::<_, Booking>(&format!("{} WHERE user_id = $1 {}", base, order))
                    .bind(user)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingScope::ForDentist(dentist) => {
                sqlx::query_as::<_, Booking>(&format!("{} WHERE dentist_id = $1 {}", base, order))
                    .bind(dentist)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn bookings_for_dentists(&self, dentist_ids: &[Uuid]) -> Result<Vec<Booking>, AppError> {
        if dentist_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE dentist_id = ANY($1) ORDER BY book_date ASC, id ASC",
            BOOKING_COLUMNS, BOOKINGS_TABLE
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(dentist_ids.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", BOOKING_COLUMNS, BOOKINGS_TABLE);
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        let b = new.into_booking();
        let mut tx = self.pool.begin().await?;
        // The per-user rule is reported ahead of the schedule rule; the indexes still
        // catch concurrent inserts that slip past this check.
        if b.exclusive {
            let sql = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND exclusive)",
                BOOKINGS_TABLE
            );
            let held: bool = sqlx::query_scalar(&sql).bind(&b.user).fetch_one(&mut *tx).await?;
            if held {
                return Err(AppError::Duplicate(UniqueViolation::UserBooking));
            }
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            BOOKINGS_TABLE, BOOKING_COLUMNS, BOOKING_COLUMNS
        );
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(b.id)
            .bind(b.book_date)
            .bind(&b.user)
            .bind(b.dentist)
            .bind(b.exclusive)
            .bind(b.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await?;
        Ok(booking)
    }

    /// Owner and exclusivity never change here, so only the schedule rule can be broken.
    async fn update_booking(&self, id: Uuid, patch: BookingPatch) -> Result<Option<Booking>, AppError> {
        let sql = format!(
            "UPDATE {} SET book_date = COALESCE($2, book_date), dentist_id = COALESCE($3, dentist_id) \
             WHERE id = $1 RETURNING {}",
            BOOKINGS_TABLE, BOOKING_COLUMNS
        );
        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .bind(patch.book_date)
            .bind(patch.dentist)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_booking(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", BOOKINGS_TABLE);
        let r = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn delete_bookings_for_dentist(&self, dentist_id: Uuid) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE dentist_id = $1", BOOKINGS_TABLE);
        let r = sqlx::query(&sql).bind(dentist_id).execute(&self.pool).await?;
        Ok(r.rows_affected())
    }
}

/// Ensure the database named in `database_url` exists, creating it if not. Connects to the
/// `postgres` maintenance database on the same server. Call before opening the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::Invalid {
        var: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (url of the `postgres` database, target database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| ConfigError::Invalid {
            var: "DATABASE_URL",
            reason: "no database path".into(),
        })?;
    let path_and_query = &url[path_start..];
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim().to_string();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let admin_url = format!("{}postgres{}", &url[..path_start], query);
    Ok((admin_url, db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_targets_postgres_database() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/dental?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres?sslmode=disable");
        assert_eq!(name, "dental");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert!(parse_db_name_from_url("postgres://localhost").is_err());
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn other_errors_are_not_duplicates() {
        assert!(matches!(map_write_error(sqlx::Error::RowNotFound), AppError::Db(_)));
    }
}
