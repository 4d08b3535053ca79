//! Database row types. These map directly to SQLite rows and stay
//! independent from the facebluff-types wire models.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub profile_picture: Option<String>,
    pub points: i64,
    /// Rotated on every profile update; tokens issued before carry a stale one.
    pub session_id: String,
}

/// Input for registration. The password is clear text here and only ever
/// stored hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub profile_picture: Option<String>,
    pub points: i64,
}

/// A profile rewrite. Points are server-owned and never part of it.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub profile_picture: Option<String>,
}

/// The other party of a relation, or a search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendEdgeRow {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendStatus {
    Pending,
    Confirmed,
}

impl FriendStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            FriendStatus::Pending => 0,
            FriendStatus::Confirmed => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(FriendStatus::Pending),
            1 => Some(FriendStatus::Confirmed),
            _ => None,
        }
    }
}

impl ToSql for FriendStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for FriendStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        FriendStatus::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRelation {
    pub requester: String,
    pub recipient: String,
    pub status: FriendStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub id: i64,
    pub is_default: bool,
    pub text: String,
    pub op1: Option<String>,
    pub op2: Option<String>,
    pub op3: Option<String>,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub is_default: bool,
    pub text: String,
    pub op1: Option<String>,
    pub op2: Option<String>,
    pub op3: Option<String>,
    pub other: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub question: String,
}
