use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};

/// A column value ready to be bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub(crate) fn push_bind(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Null => builder.push_bind(None::<i64>),
            Value::Integer(v) => builder.push_bind(*v),
            Value::Text(v) => builder.push_bind(v.clone()),
            Value::Date(v) => builder.push_bind(*v),
        };
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}
