use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::repository::{self, Filter, OrderBy, Resource};
use crate::db::schema::{Field, FieldType, Schema};
use crate::db::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

impl Resource for Category {
    const SCHEMA: &'static Schema = &Schema {
        table: "categories",
        fields: &[Field::id("id"), Field::required("type", FieldType::Text)],
    };
}

/// `{id: type}` for every category, ordered by id.
pub async fn categories_by_id(pool: &SqlitePool) -> StoreResult<BTreeMap<i64, String>> {
    let categories: Vec<Category> = repository::fetch_all(pool, OrderBy::asc("id")).await?;
    Ok(categories.into_iter().map(|c| (c.id, c.kind)).collect())
}

pub async fn find_by_type(pool: &SqlitePool, kind: &str) -> StoreResult<Category> {
    repository::fetch_first_filtered(pool, &Filter::new().eq("type", kind), OrderBy::asc("id"))
        .await
}

pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> StoreResult<()> {
    let mut tx = pool.begin().await?;
    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
ON CONFLICT (id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
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
    async fn mapping_is_keyed_by_id() {
        let pool = test_pool().await;
        let categories = categories_by_id(&pool).await.unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[&2], "Art");
        let json = serde_json::to_value(&categories).unwrap();
        assert_eq!(json["6"], "Sports");
    }

    #[tokio::test]
    async fn resolves_categories_by_display_name() {
        let pool = test_pool().await;
        assert_eq!(find_by_type(&pool, "Geography").await.unwrap().id, 3);
        assert!(matches!(
            find_by_type(&pool, "Cooking").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn import_upserts_by_id() {
        let pool = test_pool().await;
        import_categories(
            &pool,
            vec![
                Category { id: 1, kind: "Natural Science".to_owned() },
                Category { id: 7, kind: "Music".to_owned() },
            ],
        )
        .await
        .unwrap();
        let categories = categories_by_id(&pool).await.unwrap();
        assert_eq!(categories[&1], "Natural Science");
        assert_eq!(categories[&7], "Music");
        assert_eq!(categories.len(), 7);
    }
}
