use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use super::{AccountLookup, SignupStore, SignupTransaction, StoreError};
use crate::models::{Account, Profile, Role, Scope};
use crate::signup::rules::Field;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, auth_key, scope, confirmed_at, blocked_at, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Changes an administrator applies to an existing account in one go.
#[derive(Debug, Clone)]
pub struct AccountUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub roles: &'a [String],
    pub updated_at: DateTime<Utc>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_account(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ? LIMIT 1", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    pub async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, name, firstname, public_email, salutation, profession, address, city, zipcode, phone, mobile, \
             workplace_type, workplace_name, riziv_number, apb_number, responsible_pneumologist \
             FROM profiles WHERE user_id = ? LIMIT 1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Profile {
            user_id: r.get::<String, _>("user_id"),
            name: r.get::<String, _>("name"),
            firstname: r.get::<String, _>("firstname"),
            public_email: r.get::<String, _>("public_email"),
            salutation: r.get::<String, _>("salutation"),
            profession: r.get::<String, _>("profession"),
            address: r.get::<String, _>("address"),
            city: r.get::<String, _>("city"),
            zipcode: r.get::<String, _>("zipcode"),
            phone: r.get::<String, _>("phone"),
            mobile: r.get::<String, _>("mobile"),
            workplace_type: r.get::<String, _>("workplace_type"),
            workplace_name: r.get::<String, _>("workplace_name"),
            riziv_number: r.get::<String, _>("riziv_number"),
            apb_number: r.get::<String, _>("apb_number"),
            responsible_pneumologist: r.get::<String, _>("responsible_pneumologist"),
        }))
    }

    /// Whether an account other than `except_id` already uses the value.
    pub async fn taken_by_other(
        &self,
        field: Field,
        value: &str,
        except_id: &str,
    ) -> Result<bool, StoreError> {
        let column = unique_column(field)?;
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(1) FROM users WHERE {} = ? AND id != ?",
            column
        ))
        .bind(value)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query("SELECT name, description FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| -> Result<Role, StoreError> {
                Ok(Role {
                    name: r.try_get("name")?,
                    description: r.try_get("description")?,
                })
            })
            .collect()
    }

    pub async fn active_roles(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT role_name FROM role_assignments WHERE user_id = ? ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Rewrites the account columns and its role assignments atomically.
    pub async fn update_account(&self, id: &str, update: &AccountUpdate<'_>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = COALESCE(?, password_hash), updated_at = ? WHERE id = ?",
        )
        .bind(update.username)
        .bind(update.email)
        .bind(update.password_hash)
        .bind(update.updated_at.to_rfc3339())
        .bind(id)
        .execute(&mut tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        }

        sqlx::query("DELETE FROM role_assignments WHERE user_id = ?")
            .bind(id)
            .execute(&mut tx)
            .await?;

        for role in update.roles {
            sqlx::query("INSERT INTO role_assignments (user_id, role_name, created_at) VALUES (?, ?, ?)")
                .bind(id)
                .bind(role)
                .bind(update.updated_at.to_rfc3339())
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Sets `confirmed_at` unless it is already set. Returns whether a row
    /// changed.
    pub async fn confirm(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET confirmed_at = ?, updated_at = ? WHERE id = ? AND confirmed_at IS NULL",
        )
        .bind(at.to_rfc3339())
        .bind(at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Blocks the account and swaps its auth key unless it is already
    /// blocked. Returns whether a row changed.
    pub async fn block(&self, id: &str, at: DateTime<Utc>, auth_key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET blocked_at = ?, auth_key = ?, updated_at = ? WHERE id = ? AND blocked_at IS NULL",
        )
        .bind(at.to_rfc3339())
        .bind(auth_key)
        .bind(at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn unblock(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET blocked_at = NULL, updated_at = ? WHERE id = ? AND blocked_at IS NOT NULL",
        )
        .bind(at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountLookup for SqliteStore {
    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl SignupStore for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn SignupTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteSignupTransaction { tx }))
    }
}

struct SqliteSignupTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl SignupTransaction for SqliteSignupTransaction {
    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, auth_key, scope, confirmed_at, blocked_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.auth_key)
        .bind(account.scope.as_str())
        .bind(account.confirmed_at.map(|t| t.to_rfc3339()))
        .bind(account.blocked_at.map(|t| t.to_rfc3339()))
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(&mut self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn insert_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO profiles (user_id, name, firstname, public_email, salutation, profession, address, city, zipcode, phone, mobile, \
             workplace_type, workplace_name, riziv_number, apb_number, responsible_pneumologist) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&profile.user_id)
        .bind(&profile.name)
        .bind(&profile.firstname)
        .bind(&profile.public_email)
        .bind(&profile.salutation)
        .bind(&profile.profession)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.zipcode)
        .bind(&profile.phone)
        .bind(&profile.mobile)
        .bind(&profile.workplace_type)
        .bind(&profile.workplace_name)
        .bind(&profile.riziv_number)
        .bind(&profile.apb_number)
        .bind(&profile.responsible_pneumologist)
        .execute(&mut self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}

fn unique_column(field: Field) -> Result<&'static str, StoreError> {
    match field {
        Field::Username => Ok("username"),
        Field::Email => Ok("email"),
        other => Err(StoreError::Corrupt(format!("{} is not a unique account column", other))),
    }
}

// SQLite reports "UNIQUE constraint failed: users.username".
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let message = db.message();
        if message.contains("UNIQUE constraint failed") {
            if message.contains("users.username") {
                return StoreError::Conflict(Field::Username);
            }
            if message.contains("users.email") {
                return StoreError::Conflict(Field::Email);
            }
        }
    }
    StoreError::Database(err)
}

fn parse_time(column: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", column, e)))
}

fn optional_time(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
    row.try_get::<Option<String>, _>(column)?
        .map(|v| parse_time(column, &v))
        .transpose()
}

fn account_from_row(row: &SqliteRow) -> Result<Account, StoreError> {
    let scope = row.get::<String, _>("scope");
    Ok(Account {
        id: row.get::<String, _>("id"),
        username: row.get::<String, _>("username"),
        email: row.get::<String, _>("email"),
        password_hash: row.get::<String, _>("password_hash"),
        auth_key: row.get::<String, _>("auth_key"),
        scope: Scope::parse(&scope)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown scope {}", scope)))?,
        confirmed_at: optional_time(row, "confirmed_at")?,
        blocked_at: optional_time(row, "blocked_at")?,
        created_at: parse_time("created_at", &row.get::<String, _>("created_at"))?,
        updated_at: parse_time("updated_at", &row.get::<String, _>("updated_at"))?,
    })
}
