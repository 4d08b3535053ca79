use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::error::Result;

/// Bring the schema up to date. The version check and every step run in
/// one IMMEDIATE transaction, so concurrent openers of a fresh file
/// serialize on the write lock instead of racing.
pub fn run(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = tx.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("running migration v1 (users, friends, questions)");
        tx.execute_batch(
            "
            CREATE TABLE users (
                email           TEXT PRIMARY KEY,
                password_hash   TEXT NOT NULL,
                name            TEXT NOT NULL,
                gender          TEXT NOT NULL,
                birthdate       TEXT NOT NULL,
                profile_picture TEXT,
                points          INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_users_name ON users(name);

            -- user1 sent the request, user2 received it.
            CREATE TABLE friends (
                user1   TEXT NOT NULL REFERENCES users(email) ON UPDATE CASCADE,
                user2   TEXT NOT NULL REFERENCES users(email) ON UPDATE CASCADE,
                status  INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1)),
                PRIMARY KEY (user1, user2),
                CHECK (user1 <> user2)
            );

            CREATE INDEX idx_friends_recipient ON friends(user2, status);

            CREATE TABLE questions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                is_default  INTEGER NOT NULL DEFAULT 0,
                text        TEXT NOT NULL,
                op1         TEXT,
                op2         TEXT,
                op3         TEXT,
                other       TEXT
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        // Tokens carry the session id; rotating it logs every holder out.
        info!("running migration v2 (users.session_id)");
        tx.execute_batch(
            "
            ALTER TABLE users ADD COLUMN session_id TEXT NOT NULL DEFAULT '';
            UPDATE users SET session_id = lower(hex(randomblob(16)));
            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    tx.commit()?;
    info!("database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 2);
    }

    #[test]
    fn concurrent_openers_of_a_fresh_file_both_succeed() {
        let path = std::env::temp_dir().join(format!("facebluff_migrate_{}.db", uuid::Uuid::new_v4()));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut conn = Connection::open(&path).unwrap();
                    conn.busy_timeout(std::time::Duration::from_secs(5)).unwrap();
                    run(&mut conn)
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(versions, vec![1, 2]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_self_relation() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO users (email, password_hash, name, gender, birthdate)
             VALUES ('a@x.com', 'h', 'A', 'f', '1990-01-01')",
            [],
        )
        .unwrap();

        let err = conn
            .execute(
                "INSERT INTO friends (user1, user2, status) VALUES ('a@x.com', 'a@x.com', 0)",
                [],
            )
            .unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }
}
