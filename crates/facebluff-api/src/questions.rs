use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use facebluff_db::models::{NewQuestion, QuestionRow};
use facebluff_types::api::{NewQuestionRequest, NewQuestionResponse};
use facebluff_types::models::{Question, QuestionPrompt};

use crate::AppState;
use crate::error::ApiError;

pub async fn random_questions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let prompts: Vec<QuestionPrompt> = state
        .questions
        .random_questions()
        .await?
        .into_iter()
        .map(|p| QuestionPrompt {
            question: p.question,
        })
        .collect();

    Ok(Json(prompts))
}

/// A bare text without options takes the quick path; anything else is
/// stored with its options.
pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<NewQuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("question text is empty".into()));
    }

    let bare = !req.is_default
        && req.op1.is_none()
        && req.op2.is_none()
        && req.op3.is_none()
        && req.other.is_none();

    let id = if bare {
        state.questions.create_new_question(text).await?
    } else {
        state
            .questions
            .insert_question(&NewQuestion {
                is_default: req.is_default,
                text: text.to_string(),
                op1: req.op1,
                op2: req.op2,
                op3: req.op3,
                other: req.other,
            })
            .await?
    };

    Ok((StatusCode::CREATED, Json(NewQuestionResponse { id })))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .questions
        .get_question(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(question_to_wire(row)))
}

fn question_to_wire(row: QuestionRow) -> Question {
    Question {
        id: row.id,
        is_default: row.is_default,
        text: row.text,
        op1: row.op1,
        op2: row.op2,
        op3: row.op3,
        other: row.other,
    }
}
