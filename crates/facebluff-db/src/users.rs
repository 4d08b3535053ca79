use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::Database;
use crate::error::Result;
use crate::models::{NewUser, ProfileUpdate, UserRow};
use crate::password;

/// Users and their friend relations. Friend operations live in `friends.rs`.
#[derive(Clone)]
pub struct UserRepository {
    pub(crate) db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a user. A taken email surfaces as `DbError::Constraint`.
    pub async fn create_user(&self, user: &NewUser) -> Result<()> {
        let password_hash = password::hash_blocking(user.password.clone()).await?;
        let user = user.clone();

        self.db
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO users (email, password_hash, name, gender, birthdate, profile_picture, points, session_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        user.email,
                        password_hash,
                        user.name,
                        user.gender,
                        user.birthdate,
                        user.profile_picture,
                        user.points,
                        new_session_id()
                    ],
                )?;
                debug!("Created user {}", user.email);
                Ok(())
            })
            .await
    }

    /// `false` for an unknown email and for a wrong password alike.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<bool> {
        let email = email.to_string();
        let stored: Option<String> = self
            .db
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT password_hash FROM users WHERE email = ?1",
                        [&email],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await?;

        password::verify_blocking(password.to_string(), stored).await
    }

    pub async fn get_profile_picture_name(&self, email: &str) -> Result<Option<String>> {
        let email = email.to_string();
        self.db
            .with_conn(move |conn| {
                let picture: Option<Option<String>> = conn
                    .query_row(
                        "SELECT profile_picture FROM users WHERE email = ?1",
                        [&email],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(picture.flatten())
            })
            .await
    }

    /// Rewrite the profile of the user currently known as `current_email`,
    /// the email included, in one statement. Points are left as stored and
    /// the session id is rotated. Returns `false` when no such user exists.
    pub async fn update_user(&self, current_email: &str, user: &ProfileUpdate) -> Result<bool> {
        let password_hash = password::hash_blocking(user.password.clone()).await?;
        let current_email = current_email.to_string();
        let user = user.clone();

        self.db
            .with_conn(move |conn| {
                let changed = conn.execute(
                    "UPDATE users
                     SET email = ?1, password_hash = ?2, name = ?3, gender = ?4,
                         birthdate = ?5, profile_picture = ?6, session_id = ?7
                     WHERE email = ?8",
                    params![
                        user.email,
                        password_hash,
                        user.name,
                        user.gender,
                        user.birthdate,
                        user.profile_picture,
                        new_session_id(),
                        current_email
                    ],
                )?;
                if changed > 0 && current_email != user.email {
                    debug!("User {} renamed to {}", current_email, user.email);
                }
                Ok(changed > 0)
            })
            .await
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<UserRow>> {
        let email = email.to_string();
        self.db
            .with_conn(move |conn| query_user(conn, &email))
            .await
    }

    /// Current session id of `email`, `None` for an unknown user.
    pub async fn session_id(&self, email: &str) -> Result<Option<String>> {
        let email = email.to_string();
        self.db
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT session_id FROM users WHERE email = ?1",
                        [&email],
                        |row| row.get(0),
                    )
                    .optional()?)
            })
            .await
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn query_user(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT email, password_hash, name, gender, birthdate, profile_picture, points, session_id
         FROM users WHERE email = ?1",
    )?;

    let row = stmt.query_row([email], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        email: row.get(0)?,
        password_hash: row.get(1)?,
        name: row.get(2)?,
        gender: row.get(3)?,
        birthdate: row.get(4)?,
        profile_picture: row.get(5)?,
        points: row.get(6)?,
        session_id: row.get(7)?,
    })
}
