use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::repository::{self, Filter, OrderBy, Resource};
use crate::db::schema::{Field, FieldType, Schema};
use crate::db::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl Resource for Question {
    const SCHEMA: &'static Schema = &Schema {
        table: "questions",
        fields: &[
            Field::id("id"),
            Field::required("question", FieldType::Text),
            Field::required("answer", FieldType::Text),
            Field::required("category", FieldType::Integer),
            Field::required("difficulty", FieldType::Integer),
        ],
    };
}

/// Case-insensitive substring search over the question text. No match is an
/// empty list, not an error. SQLite's `lower()` only folds ASCII, so the
/// match runs over the id ordered rows.
pub async fn search(pool: &SqlitePool, term: &str) -> StoreResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    let needle = term.to_lowercase();
    Ok(questions
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect())
}

pub async fn questions_for_category(pool: &SqlitePool, category: i64) -> StoreResult<Vec<Question>> {
    repository::fetch_all_filtered(pool, &Filter::new().eq("category", category), OrderBy::asc("id"))
        .await
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (id) DO UPDATE SET
    question = excluded.question,
    answer = excluded.answer,
    category = excluded.category,
    difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, StoreError};

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let pool = test_pool().await;
        let ids: Vec<i64> = search(&pool, "who").await.unwrap().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![5, 12, 21]);
        assert_eq!(search(&pool, "WHO").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_without_matches_is_empty() {
        let pool = test_pool().await;
        assert!(search(&pool, "xylophone").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wildcards_in_the_term_are_literal() {
        let pool = test_pool().await;
        assert!(search(&pool, "%").await.unwrap().is_empty());
        assert!(search(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_letters() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO questions (question, answer, category, difficulty) \
             VALUES ('Österreich capital?', 'Wien', 3, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        let hits = search(&pool, "österreich").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].answer, "Wien");
        assert_eq!(search(&pool, "ÖSTERREICH").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_listing_requires_questions() {
        let pool = test_pool().await;
        assert_eq!(questions_for_category(&pool, 2).await.unwrap().len(), 4);
        assert!(matches!(
            questions_for_category(&pool, 100).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn import_rejects_unknown_categories_as_a_whole() {
        let pool = test_pool().await;
        let result = import_questions(
            &pool,
            vec![
                Question {
                    id: 30,
                    question: "Q?".to_owned(),
                    answer: "A".to_owned(),
                    category: 1,
                    difficulty: 1,
                },
                Question {
                    id: 31,
                    question: "Q?".to_owned(),
                    answer: "A".to_owned(),
                    category: 100,
                    difficulty: 1,
                },
            ],
        )
        .await;
        assert!(result.is_err());
        assert_eq!(repository::count_all::<Question>(&pool).await.unwrap(), 19);
    }
}
