//! Creation-request checks driven by the resource schemas.

use serde_json::{Map, Value as Json};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::{self, Attributes, Resource};
use crate::db::schema::Schema;
use crate::db::{Category, Question, StoreError, Value};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidField(StoreError),
    #[error("category {0} does not exist")]
    UnknownCategory(i64),
    #[error(transparent)]
    Store(StoreError),
}

fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(a) => !a.is_empty(),
        Json::Object(o) => !o.is_empty(),
    }
}

/// Every required field of `schema` must be present with a truthy value.
pub fn check_required(schema: &Schema, payload: &Map<String, Json>) -> Result<(), ValidationError> {
    for field in schema.required_fields() {
        if !payload.get(field).is_some_and(is_truthy) {
            return Err(ValidationError::MissingField(field));
        }
    }
    Ok(())
}

fn coerce_all(schema: &Schema, payload: &Map<String, Json>) -> Result<Attributes, ValidationError> {
    let mut attributes = Attributes::with_capacity(payload.len());
    for (name, json) in payload {
        let (column, value) = schema
            .coerce(name, json)
            .map_err(ValidationError::InvalidField)?;
        if column == schema.primary_key() {
            return Err(ValidationError::InvalidField(StoreError::InvalidValue {
                field: column,
                reason: "assigned by the store".to_owned(),
            }));
        }
        attributes.push((column, value));
    }
    Ok(attributes)
}

/// Validated attributes for a new question, whose category must exist.
pub async fn new_question_attributes(
    pool: &SqlitePool,
    payload: &Map<String, Json>,
) -> Result<Attributes, ValidationError> {
    let schema = Question::SCHEMA;
    check_required(schema, payload)?;
    let attributes = coerce_all(schema, payload)?;

    let category = attributes
        .iter()
        .find(|(name, _)| *name == "category")
        .and_then(|(_, value)| match value {
            Value::Integer(id) => Some(*id),
            _ => None,
        })
        .ok_or(ValidationError::MissingField("category"))?;
    match repository::fetch_by_id::<Category>(pool, category).await {
        Ok(_) => Ok(attributes),
        Err(StoreError::NotFound) => Err(ValidationError::UnknownCategory(category)),
        Err(error) => Err(ValidationError::Store(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use rstest::rstest;
    use serde_json::json;

    fn payload(value: Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    #[case(json!({"answer": "A", "category": 1, "difficulty": 1}), "question")]
    #[case(json!({"question": "", "answer": "A", "category": 1, "difficulty": 1}), "question")]
    #[case(json!({"question": "Q?", "answer": null, "category": 1, "difficulty": 1}), "answer")]
    #[case(json!({"question": "Q?", "answer": "A", "category": 1, "difficulty": 0}), "difficulty")]
    #[case(json!({"question": "Q?", "answer": "A", "difficulty": 2}), "category")]
    fn falsy_or_absent_fields_are_missing(#[case] body: Json, #[case] field: &str) {
        match check_required(Question::SCHEMA, &payload(body)) {
            Err(ValidationError::MissingField(missing)) => assert_eq!(missing, field),
            other => panic!("expected missing {field}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn accepts_a_complete_question() {
        let pool = test_pool().await;
        let body = payload(json!({
            "question": "Some question?",
            "answer": "Some answer.",
            "category": "1",
            "difficulty": 5,
        }));
        let attributes = new_question_attributes(&pool, &body).await.unwrap();
        assert!(attributes.contains(&("category", Value::Integer(1))));
        assert_eq!(attributes.len(), 4);
    }

    #[tokio::test]
    async fn rejects_unknown_categories() {
        let pool = test_pool().await;
        let body = payload(json!({
            "question": "Q?", "answer": "A", "category": 100, "difficulty": 1,
        }));
        assert!(matches!(
            new_question_attributes(&pool, &body).await,
            Err(ValidationError::UnknownCategory(100))
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_fields_and_ids() {
        let pool = test_pool().await;
        for extra in [json!({"rating": 3}), json!({"id": 3})] {
            let mut body = payload(json!({
                "question": "Q?", "answer": "A", "category": 1, "difficulty": 1,
            }));
            body.extend(payload(extra));
            assert!(matches!(
                new_question_attributes(&pool, &body).await,
                Err(ValidationError::InvalidField(_))
            ));
        }
    }
}
