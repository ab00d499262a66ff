//! Generic CRUD over any [`Resource`].
//!
//! Listing operations treat "no rows" as [`StoreError::NotFound`]; callers
//! that want an empty collection to be a valid answer (search) go through
//! their own queries instead.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::error::{StoreError, StoreResult};
use super::schema::Schema;
use super::value::Value;
use crate::pagination::Page;

/// A row type stored in the table its schema describes.
pub trait Resource: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const SCHEMA: &'static Schema;
}

/// Column/value pairs already checked against a schema.
pub type Attributes = Vec<(&'static str, Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    column: &'static str,
    direction: Direction,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        OrderBy {
            column,
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        OrderBy {
            column,
            direction: Direction::Desc,
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        OrderBy::asc("id")
    }
}

/// Equality filter; every condition must hold.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((column.to_owned(), value.into()));
        self
    }
}

fn quoted(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

fn column_list(schema: &Schema) -> String {
    schema.columns().map(quoted).collect::<Vec<_>>().join(", ")
}

fn select_from(schema: &Schema) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder
        .push(column_list(schema))
        .push(" FROM ")
        .push(quoted(schema.table));
    builder
}

fn push_filter(
    builder: &mut QueryBuilder<'_, Sqlite>,
    schema: &Schema,
    filter: &Filter,
) -> StoreResult<()> {
    for (n, (name, value)) in filter.conditions.iter().enumerate() {
        let column = schema.column(name)?;
        builder
            .push(if n == 0 { " WHERE " } else { " AND " })
            .push(quoted(column));
        if *value == Value::Null {
            builder.push(" IS NULL");
        } else {
            builder.push(" = ");
            value.push_bind(builder);
        }
    }
    Ok(())
}

fn push_order(
    builder: &mut QueryBuilder<'_, Sqlite>,
    schema: &Schema,
    order_by: OrderBy,
) -> StoreResult<()> {
    let column = schema.column(order_by.column)?;
    builder.push(" ORDER BY ").push(quoted(column)).push(match order_by.direction {
        Direction::Asc => " ASC",
        Direction::Desc => " DESC",
    });
    Ok(())
}

fn non_empty<R>(rows: Vec<R>) -> StoreResult<Vec<R>> {
    if rows.is_empty() {
        Err(StoreError::NotFound)
    } else {
        Ok(rows)
    }
}

pub async fn fetch_by_id<R: Resource>(pool: &SqlitePool, id: i64) -> StoreResult<R> {
    let schema = R::SCHEMA;
    let mut builder = select_from(schema);
    builder
        .push(" WHERE ")
        .push(quoted(schema.primary_key()))
        .push(" = ")
        .push_bind(id);
    builder
        .build_query_as::<R>()
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn fetch_all<R: Resource>(pool: &SqlitePool, order_by: OrderBy) -> StoreResult<Vec<R>> {
    fetch_all_filtered(pool, &Filter::new(), order_by).await
}

pub async fn fetch_all_filtered<R: Resource>(
    pool: &SqlitePool,
    filter: &Filter,
    order_by: OrderBy,
) -> StoreResult<Vec<R>> {
    let schema = R::SCHEMA;
    let mut builder = select_from(schema);
    push_filter(&mut builder, schema, filter)?;
    push_order(&mut builder, schema, order_by)?;
    let rows = builder.build_query_as::<R>().fetch_all(pool).await?;
    non_empty(rows)
}

pub async fn fetch_first_filtered<R: Resource>(
    pool: &SqlitePool,
    filter: &Filter,
    order_by: OrderBy,
) -> StoreResult<R> {
    let schema = R::SCHEMA;
    let mut builder = select_from(schema);
    push_filter(&mut builder, schema, filter)?;
    push_order(&mut builder, schema, order_by)?;
    builder.push(" LIMIT 1");
    builder
        .build_query_as::<R>()
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Rows of one page ordered by primary key.
pub async fn fetch_page<R: Resource>(pool: &SqlitePool, page: Page) -> StoreResult<Vec<R>> {
    let total = count_all::<R>(pool).await?;
    if !page.is_in_range(total) {
        tracing::debug!(table = R::SCHEMA.table, page = page.number(), total, "Page out of range");
        return Err(StoreError::NotFound);
    }
    let schema = R::SCHEMA;
    let mut builder = select_from(schema);
    builder
        .push(" ORDER BY ")
        .push(quoted(schema.primary_key()))
        .push(" ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    Ok(builder.build_query_as::<R>().fetch_all(pool).await?)
}

pub async fn count_all<R: Resource>(pool: &SqlitePool) -> StoreResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quoted(R::SCHEMA.table));
    Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?)
}

/// Stores a new row and returns it with its assigned id.
pub async fn insert<R: Resource>(pool: &SqlitePool, attributes: Attributes) -> StoreResult<R> {
    let schema = R::SCHEMA;
    for required in schema.required_fields() {
        if !attributes.iter().any(|(name, _)| *name == required) {
            return Err(StoreError::MissingField(required));
        }
    }

    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(quoted(schema.table));
    if attributes.is_empty() {
        builder.push(" DEFAULT VALUES");
    } else {
        builder.push(" (");
        for (n, (name, _)) in attributes.iter().enumerate() {
            if n > 0 {
                builder.push(", ");
            }
            builder.push(quoted(schema.column(name)?));
        }
        builder.push(") VALUES (");
        for (n, (_, value)) in attributes.iter().enumerate() {
            if n > 0 {
                builder.push(", ");
            }
            value.push_bind(&mut builder);
        }
        builder.push(")");
    }
    builder.push(" RETURNING ").push(column_list(schema));

    let mut tx = pool.begin().await?;
    let row = builder.build_query_as::<R>().fetch_one(&mut *tx).await?;
    tx.commit().await?;
    tracing::debug!(table = schema.table, "inserted row");
    Ok(row)
}

/// Deletes a row, returning its id. Storage failures are rolled back and
/// reported as `NotFound`.
pub async fn delete_by_id<R: Resource>(pool: &SqlitePool, id: i64) -> StoreResult<i64> {
    let schema = R::SCHEMA;
    let mut builder = QueryBuilder::new("DELETE FROM ");
    builder
        .push(quoted(schema.table))
        .push(" WHERE ")
        .push(quoted(schema.primary_key()))
        .push(" = ")
        .push_bind(id);

    let outcome: Result<u64, sqlx::Error> = async {
        let mut tx = pool.begin().await?;
        let affected = builder.build().execute(&mut *tx).await?.rows_affected();
        tx.commit().await?;
        Ok(affected)
    }
    .await;

    match outcome {
        Ok(0) => Err(StoreError::NotFound),
        Ok(_) => Ok(id),
        Err(error) => {
            tracing::warn!(table = schema.table, id, %error, "delete rolled back");
            Err(StoreError::NotFound)
        }
    }
}

/// Applies the given attributes only, each converted through its field type.
pub async fn update<R: Resource>(
    pool: &SqlitePool,
    id: i64,
    attributes: &serde_json::Map<String, serde_json::Value>,
) -> StoreResult<R> {
    let schema = R::SCHEMA;
    let mut values = Attributes::with_capacity(attributes.len());
    for (name, json) in attributes {
        let (column, value) = schema.coerce(name, json)?;
        if column == schema.primary_key() {
            return Err(StoreError::InvalidValue {
                field: column,
                reason: "primary key can not be changed".to_owned(),
            });
        }
        values.push((column, value));
    }
    if values.is_empty() {
        return fetch_by_id(pool, id).await;
    }

    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(quoted(schema.table)).push(" SET ");
    for (n, (column, value)) in values.iter().enumerate() {
        if n > 0 {
            builder.push(", ");
        }
        builder.push(quoted(column)).push(" = ");
        value.push_bind(&mut builder);
    }
    builder
        .push(" WHERE ")
        .push(quoted(schema.primary_key()))
        .push(" = ")
        .push_bind(id)
        .push(" RETURNING ")
        .push(column_list(schema));

    let outcome: Result<Option<R>, sqlx::Error> = async {
        let mut tx = pool.begin().await?;
        let row = builder.build_query_as::<R>().fetch_optional(&mut *tx).await?;
        tx.commit().await?;
        Ok(row)
    }
    .await;

    match outcome {
        Ok(Some(row)) => Ok(row),
        Ok(None) => Err(StoreError::NotFound),
        Err(error) => {
            tracing::warn!(table = schema.table, id, %error, "update rolled back");
            Err(StoreError::NotFound)
        }
    }
}
