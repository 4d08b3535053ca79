use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user's profile as shown to the logged-in user. Never carries the
/// password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub profile_picture: Option<String>,
    pub points: i64,
}

/// The other party of a friend relation, or a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSummary {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationState {
    Pending,
    Confirmed,
}

/// Relation between the caller and another user, from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub requester: String,
    pub recipient: String,
    pub state: RelationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPrompt {
    pub question: String,
}

/// A stored question. Option slots keep their position, so a question
/// with only `op2` set still reports `op1` as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub is_default: bool,
    pub text: String,
    pub op1: Option<String>,
    pub op2: Option<String>,
    pub op3: Option<String>,
    pub other: Option<String>,
}
