//! Static field tables for the persisted resources.
//!
//! Every SQL identifier the repository emits comes from one of these tables,
//! and every JSON attribute it stores is converted through the declared
//! [`FieldType`] of its field.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::error::{StoreError, StoreResult};
use super::value::Value;
use crate::deserializers::parse_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    Date,
}

impl FieldType {
    pub fn sql_name(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Text => "TEXT",
            FieldType::Date => "DATE",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
}

impl Field {
    /// Auto-assigned integer primary key.
    pub const fn id(name: &'static str) -> Self {
        Field {
            name,
            ty: FieldType::Integer,
            nullable: false,
            primary_key: true,
            auto_increment: true,
        }
    }

    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Field {
            name,
            ty,
            nullable: false,
            primary_key: false,
            auto_increment: false,
        }
    }

    pub const fn nullable(name: &'static str, ty: FieldType) -> Self {
        Field {
            name,
            ty,
            nullable: true,
            primary_key: false,
            auto_increment: false,
        }
    }

    fn is_required(&self) -> bool {
        (!self.nullable && !self.primary_key) || (self.primary_key && !self.auto_increment)
    }
}

#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> StoreResult<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| StoreError::UnknownField {
                table: self.table,
                field: name.to_owned(),
            })
    }

    /// Resolves a caller supplied column name to the schema's own identifier.
    pub fn column(&self, name: &str) -> StoreResult<&'static str> {
        self.field(name).map(|f| f.name)
    }

    pub fn primary_key(&self) -> &'static str {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .map(|f| f.name)
            .unwrap_or("id")
    }

    /// Fields a creation request has to supply.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name)
            .collect()
    }

    pub fn optional_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.nullable)
            .map(|f| f.name)
            .collect()
    }

    /// Field name to type mapping, e.g. `"question": "TEXT (required)"`.
    pub fn description(&self) -> BTreeMap<&'static str, String> {
        self.fields
            .iter()
            .map(|f| {
                let mut text = f.ty.sql_name().to_owned();
                if !f.nullable {
                    text.push_str(" (required)");
                }
                (f.name, text)
            })
            .collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Converts a JSON attribute into a storable value using the field's type.
    pub fn coerce(&self, name: &str, json: &serde_json::Value) -> StoreResult<(&'static str, Value)> {
        let field = self.field(name)?;
        let invalid = |reason: &str| StoreError::InvalidValue {
            field: field.name,
            reason: reason.to_owned(),
        };
        if json.is_null() {
            return if field.nullable {
                Ok((field.name, Value::Null))
            } else {
                Err(invalid("must not be null"))
            };
        }
        let value = match field.ty {
            FieldType::Integer => match json {
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .map(Value::Integer)
                    .ok_or_else(|| invalid("expected an integer"))?,
                serde_json::Value::String(s) => {
                    Value::Integer(parse_id(s).map_err(|e| invalid(&e))?)
                }
                _ => return Err(invalid("expected an integer")),
            },
            FieldType::Text => match json {
                serde_json::Value::String(s) => Value::Text(s.clone()),
                _ => return Err(invalid("expected a string")),
            },
            FieldType::Date => match json {
                serde_json::Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(Value::Date)
                    .map_err(|e| invalid(&format!("expected an ISO-8601 date: {e}")))?,
                _ => return Err(invalid("expected an ISO-8601 date string")),
            },
        };
        Ok((field.name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Category, Question, Resource};
    use serde_json::json;

    const EVENTS: Schema = Schema {
        table: "events",
        fields: &[
            Field {
                name: "code",
                ty: FieldType::Text,
                nullable: false,
                primary_key: true,
                auto_increment: false,
            },
            Field::required("held_on", FieldType::Date),
            Field::nullable("notes", FieldType::Text),
        ],
    };

    #[test]
    fn question_requires_every_non_key_column() {
        assert_eq!(
            Question::SCHEMA.required_fields(),
            vec!["question", "answer", "category", "difficulty"]
        );
        assert!(Question::SCHEMA.optional_fields().is_empty());
        assert_eq!(Category::SCHEMA.required_fields(), vec!["type"]);
    }

    #[test]
    fn manual_primary_key_is_required() {
        assert_eq!(EVENTS.required_fields(), vec!["code", "held_on"]);
        assert_eq!(EVENTS.optional_fields(), vec!["notes"]);
        assert_eq!(EVENTS.primary_key(), "code");
    }

    #[test]
    fn description_marks_required_columns() {
        let description = Question::SCHEMA.description();
        assert_eq!(description["difficulty"], "INTEGER (required)");
        assert_eq!(EVENTS.description()["notes"], "TEXT");
    }

    #[test]
    fn date_fields_parse_iso_strings() {
        let (name, value) = EVENTS.coerce("held_on", &json!("2024-02-29")).unwrap();
        assert_eq!(name, "held_on");
        assert_eq!(
            value,
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(EVENTS.coerce("held_on", &json!("29/02/2024")).is_err());
    }

    #[test]
    fn dates_are_typed_by_schema_not_by_name() {
        // "notes" is text, so a date-looking string stays text.
        let (_, value) = EVENTS.coerce("notes", &json!("2024-02-29")).unwrap();
        assert_eq!(value, Value::Text("2024-02-29".to_owned()));
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let (_, value) = Question::SCHEMA.coerce("category", &json!("3")).unwrap();
        assert_eq!(value, Value::Integer(3));
        assert!(Question::SCHEMA.coerce("category", &json!("art")).is_err());
        assert!(Question::SCHEMA.coerce("difficulty", &json!(2.5)).is_err());
    }

    #[test]
    fn null_is_only_allowed_for_nullable_fields() {
        assert_eq!(EVENTS.coerce("notes", &json!(null)).unwrap().1, Value::Null);
        assert!(Question::SCHEMA.coerce("answer", &json!(null)).is_err());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        assert!(matches!(
            Question::SCHEMA.column("question; DROP TABLE questions"),
            Err(StoreError::UnknownField { .. })
        ));
    }
}
