//! CSV export and import of the whole data set.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use super::queries::categories::import_categories;
use super::queries::questions::import_questions;
use super::repository::{fetch_all, OrderBy};
use super::{Category, Question, StoreResult};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

fn or_empty<T>(rows: StoreResult<Vec<T>>) -> StoreResult<Vec<T>> {
    match rows {
        Err(error) if error.is_not_found() => Ok(Vec::new()),
        rows => rows,
    }
}

pub async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = or_empty(fetch_all(pool, OrderBy::asc("id")).await)?;
    let questions: Vec<Question> = or_empty(fetch_all(pool, OrderBy::asc("id")).await)?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    write_to(&path.join(CATEGORIES_FILE), categories)?;
    write_to(&path.join(QUESTIONS_FILE), questions)?;
    tracing::info!(path = %path.display(), "Exported trivia data");
    Ok(())
}

/// Categories go first so that questions can reference them.
pub async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&path.join(QUESTIONS_FILE))?;
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    tracing::info!(path = %path.display(), "Imported trivia data");
    Ok(())
}
