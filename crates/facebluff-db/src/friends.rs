//! Friend relations. A row `(user1, user2, status)` is a request sent by
//! `user1` to `user2`; once confirmed it counts as friendship both ways.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::Result;
use crate::models::{FriendEdgeRow, FriendRelation, FriendStatus};
use crate::users::UserRepository;

/// Rows where the user received the request; yields the requester.
const INCOMING: &str = "SELECT u.name, f.user1
     FROM friends f
     JOIN users u ON u.email = f.user1
     WHERE f.user2 = ?1 AND f.status = ?2
     ORDER BY u.name, f.user1";

/// Rows where the user sent the request; yields the recipient.
const OUTGOING: &str = "SELECT u.name, f.user2
     FROM friends f
     JOIN users u ON u.email = f.user2
     WHERE f.user1 = ?1 AND f.status = ?2
     ORDER BY u.name, f.user2";

impl UserRepository {
    /// Confirmed friends in both directions: those who sent the user a
    /// request first, then those the user sent one to.
    pub async fn get_friends(&self, email: &str) -> Result<Vec<FriendEdgeRow>> {
        let incoming_email = email.to_string();
        let outgoing_email = email.to_string();

        let (mut friends, outgoing) = tokio::try_join!(
            self.db.with_conn(move |conn| {
                query_edges(conn, INCOMING, &incoming_email, FriendStatus::Confirmed)
            }),
            self.db.with_conn(move |conn| {
                query_edges(conn, OUTGOING, &outgoing_email, FriendStatus::Confirmed)
            }),
        )?;

        friends.extend(outgoing);
        Ok(friends)
    }

    /// Requests waiting for the user's answer. Only the recipient sees them.
    pub async fn get_pending_requests(&self, email: &str) -> Result<Vec<FriendEdgeRow>> {
        let email = email.to_string();
        self.db
            .with_conn(move |conn| query_edges(conn, INCOMING, &email, FriendStatus::Pending))
            .await
    }

    /// Users whose name contains `pattern` (ASCII case-insensitive), minus
    /// `exclude_email` and anyone already related to it in either direction.
    pub async fn search_users(
        &self,
        pattern: &str,
        exclude_email: &str,
    ) -> Result<Vec<FriendEdgeRow>> {
        let like = like_pattern(pattern);
        let exclude_email = exclude_email.to_string();

        self.db
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    r"SELECT name, email FROM users
                      WHERE email <> ?1
                        AND name LIKE ?2 ESCAPE '\'
                        AND email NOT IN (SELECT user1 FROM friends WHERE user2 = ?1)
                        AND email NOT IN (SELECT user2 FROM friends WHERE user1 = ?1)
                      ORDER BY name, email",
                )?;

                let rows = stmt
                    .query_map(params![exclude_email, like], |row| {
                        Ok(FriendEdgeRow {
                            name: row.get(0)?,
                            email: row.get(1)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(rows)
            })
            .await
    }

    /// Create a pending request from `requester` to `recipient`.
    ///
    /// Returns `false` without touching the store when the pair is already
    /// related in either direction or both sides are the same user. An
    /// unknown user is a foreign-key `DbError::Constraint`.
    pub async fn send_friend_request(&self, requester: &str, recipient: &str) -> Result<bool> {
        if requester == recipient {
            return Ok(false);
        }
        let requester = requester.to_string();
        let recipient = recipient.to_string();

        self.db
            .with_conn(move |conn| {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO friends (user1, user2, status)
                     SELECT ?1, ?2, ?3
                     WHERE NOT EXISTS (SELECT 1 FROM friends WHERE user1 = ?2 AND user2 = ?1)",
                    params![requester, recipient, FriendStatus::Pending],
                )?;
                if inserted > 0 {
                    debug!("Friend request {} -> {}", requester, recipient);
                }
                Ok(inserted > 0)
            })
            .await
    }

    /// Accept (confirm) or reject (delete) the pending request sent by
    /// `requester` to `recipient`. Returns `false` when there is no pending
    /// request for that ordered pair; confirmed rows are never touched.
    pub async fn resolve_friend_request(
        &self,
        requester: &str,
        recipient: &str,
        accept: bool,
    ) -> Result<bool> {
        let requester = requester.to_string();
        let recipient = recipient.to_string();

        self.db
            .with_conn(move |conn| {
                let changed = if accept {
                    conn.execute(
                        "UPDATE friends SET status = ?3
                         WHERE user1 = ?1 AND user2 = ?2 AND status = ?4",
                        params![
                            requester,
                            recipient,
                            FriendStatus::Confirmed,
                            FriendStatus::Pending
                        ],
                    )?
                } else {
                    conn.execute(
                        "DELETE FROM friends WHERE user1 = ?1 AND user2 = ?2 AND status = ?3",
                        params![requester, recipient, FriendStatus::Pending],
                    )?
                };
                debug!(
                    "Friend request {} -> {} {} ({} rows)",
                    requester,
                    recipient,
                    if accept { "accepted" } else { "rejected" },
                    changed
                );
                Ok(changed > 0)
            })
            .await
    }

    /// The relation between two users, whichever of them sent the request.
    pub async fn friend_relation(&self, a: &str, b: &str) -> Result<Option<FriendRelation>> {
        let a = a.to_string();
        let b = b.to_string();

        self.db
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT user1, user2, status FROM friends
                         WHERE (user1 = ?1 AND user2 = ?2) OR (user1 = ?2 AND user2 = ?1)
                         LIMIT 1",
                        params![a, b],
                        |row| {
                            Ok(FriendRelation {
                                requester: row.get(0)?,
                                recipient: row.get(1)?,
                                status: row.get(2)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }
}

fn query_edges(
    conn: &Connection,
    sql: &str,
    email: &str,
    status: FriendStatus,
) -> Result<Vec<FriendEdgeRow>> {
    let mut stmt = conn.prepare_cached(sql)?;

    let rows = stmt
        .query_map(params![email, status], |row| {
            Ok(FriendEdgeRow {
                name: row.get(0)?,
                email: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// `%needle%` with LIKE metacharacters escaped by `\`.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
