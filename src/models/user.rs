//! User model
//!
//! Owner of profiles and meal plans.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{DbError, DbResult};

/// An application user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
}

impl User {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new user. Emails are stored trimmed and lowercased.
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        let name = data.name.trim();
        let email = data.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(DbError::InvalidInput("User name must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(DbError::InvalidInput(format!("Invalid email address: {}", data.email)));
        }

        conn.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;

        let id = conn.last_insert_rowid();
        info!(user_id = id, "created user");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "User", id })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by email (case-insensitive)
    pub fn get_by_email(conn: &Connection, email: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1")?;

        let result = stmt.query_row([email.trim().to_lowercase()], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List users ordered by name
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY name, id LIMIT ?1 OFFSET ?2")?;

        let users = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user. Profile and meal plan rows go with it.
    ///
    /// Returns the number of meal plan entries removed, or `None` when the
    /// user does not exist. All three deletes commit together or not at all.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<Option<usize>> {
        let tx = conn.unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }

        // Explicit so the cleanup does not depend on the foreign_keys pragma
        let meal_plan_removed = tx.execute("DELETE FROM meal_plan WHERE user_id = ?1", [id])?;
        tx.execute("DELETE FROM user_profiles WHERE user_id = ?1", [id])?;
        tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(user_id = id, meal_plan_removed, "deleted user");
        Ok(Some(meal_plan_removed))
    }
}
