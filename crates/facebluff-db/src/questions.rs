use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::Database;
use crate::error::Result;
use crate::models::{NewQuestion, QuestionPrompt, QuestionRow};

/// Prompts returned by one `random_questions` call.
pub const RANDOM_SAMPLE_SIZE: u32 = 4;

#[derive(Clone)]
pub struct QuestionRepository {
    db: Database,
}

impl QuestionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a question with its options. Returns the assigned id.
    pub async fn insert_question(&self, question: &NewQuestion) -> Result<i64> {
        let question = question.clone();
        self.db
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO questions (is_default, text, op1, op2, op3, other)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        question.is_default,
                        question.text,
                        question.op1,
                        question.op2,
                        question.op3,
                        question.other
                    ],
                )?;
                let id = conn.last_insert_rowid();
                debug!("Inserted question {}", id);
                Ok(id)
            })
            .await
    }

    /// Quick path for a bare question text: not a default question, no
    /// options yet.
    pub async fn create_new_question(&self, text: &str) -> Result<i64> {
        self.insert_question(&NewQuestion {
            text: text.to_string(),
            ..NewQuestion::default()
        })
        .await
    }

    /// Up to four prompts sampled uniformly; fewer only when the table is
    /// smaller than that.
    pub async fn random_questions(&self) -> Result<Vec<QuestionPrompt>> {
        self.db
            .with_conn(|conn| {
                // LIMIT keeps SQLite's sorter bounded to the sample size.
                let mut stmt =
                    conn.prepare_cached("SELECT text FROM questions ORDER BY random() LIMIT ?1")?;

                let rows = stmt
                    .query_map([RANDOM_SAMPLE_SIZE], |row| {
                        Ok(QuestionPrompt {
                            question: row.get(0)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(rows)
            })
            .await
    }

    pub async fn get_question(&self, id: i64) -> Result<Option<QuestionRow>> {
        self.db
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, is_default, text, op1, op2, op3, other
                         FROM questions WHERE id = ?1",
                        [id],
                        |row| {
                            Ok(QuestionRow {
                                id: row.get(0)?,
                                is_default: row.get(1)?,
                                text: row.get(2)?,
                                op1: row.get(3)?,
                                op2: row.get(4)?,
                                op3: row.get(5)?,
                                other: row.get(6)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }
}
