use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::categories_by_id, questions},
        repository, Question,
    },
    pagination::Page,
    server::{
        app::{AppState, PageSize},
        error::ApiError,
        extract::{AppJson, IdPath},
    },
    validation::new_question_attributes,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

#[derive(Deserialize)]
struct SearchRequest {
    search_term: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedQuestion {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedQuestion {
    success: bool,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
}

async fn questions_page(
    State(pool): State<SqlitePool>,
    State(PageSize(per_page)): State<PageSize>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let page = Page::new(page.unwrap_or(1), per_page).map_err(|_| ApiError::NotFound)?;
    let questions = repository::fetch_page(&pool, page).await?;
    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions: repository::count_all::<Question>(&pool).await?,
        categories: categories_by_id(&pool).await?,
        current_category: None,
    }))
}

async fn get_question(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<QuestionsPage>> {
    let question: Question = repository::fetch_by_id(&pool, id).await?;
    let current_category = Some(question.category);
    Ok(Json(QuestionsPage {
        success: true,
        questions: vec![question],
        total_questions: repository::count_all::<Question>(&pool).await?,
        categories: categories_by_id(&pool).await?,
        current_category,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<Map<String, serde_json::Value>>,
) -> ApiResponse<Json<CreatedQuestion>> {
    let attributes = new_question_attributes(&pool, &payload).await?;
    let question: Question = repository::insert(&pool, attributes).await?;
    tracing::info!(id = question.id, "Created question");
    Ok(Json(CreatedQuestion {
        success: true,
        questions: vec![question],
        total_questions: repository::count_all::<Question>(&pool).await?,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<DeletedQuestion>> {
    repository::delete_by_id::<Question>(&pool, id).await?;
    tracing::info!(id, "Deleted question");
    Ok(Json(DeletedQuestion {
        success: true,
        total_questions: repository::count_all::<Question>(&pool).await?,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    AppJson(SearchRequest { search_term }): AppJson<SearchRequest>,
) -> ApiResponse<Json<SearchResults>> {
    let questions = questions::search(&pool, &search_term).await?;
    Ok(Json(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_page).post(create_question))
        .route("/questions/search", post(search_questions))
        .route(
            "/questions/{id}",
            get(get_question).delete(delete_question),
        )
        .with_state(state)
}
