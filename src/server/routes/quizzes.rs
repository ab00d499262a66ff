use std::collections::HashSet;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::Question,
    deserializers::FlexibleId,
    quiz::{next_question, CategorySelector},
    server::{app::AppState, extract::AppJson},
};

use super::ApiResponse;

// The front-end does not send a reliable category id, so the category is
// resolved by its `type`; `id` is accepted and ignored.
#[derive(Deserialize)]
struct QuizCategory {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct QuizRequest {
    quiz_category: QuizCategory,
    #[serde(default)]
    previous_questions: Vec<FlexibleId>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

async fn dispatch_question(
    State(pool): State<SqlitePool>,
    AppJson(request): AppJson<QuizRequest>,
) -> ApiResponse<Json<QuizQuestion>> {
    let selector = CategorySelector::from_type(&request.quiz_category.kind);
    let previous: HashSet<i64> = request.previous_questions.into_iter().map(|id| id.0).collect();
    let question = next_question(&pool, &selector, &previous).await?;
    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(dispatch_question))
        .with_state(state)
}
