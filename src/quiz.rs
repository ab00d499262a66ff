//! Picks the next quiz question. The caller supplies the full history on every
//! call; nothing about a quiz session is stored here.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db::queries::{categories, questions};
use crate::db::repository::{self, OrderBy};
use crate::db::{Question, StoreResult};
use crate::telemetry::QUIZ_QUESTIONS_CNTR;

/// Category type the front-end sends when the player picks "all".
pub const ALL_CATEGORIES_TYPE: &str = "click";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelector {
    AllCategories,
    Named(String),
}

impl CategorySelector {
    pub fn from_type(kind: &str) -> Self {
        if kind == ALL_CATEGORIES_TYPE {
            CategorySelector::AllCategories
        } else {
            CategorySelector::Named(kind.to_owned())
        }
    }

    fn label(&self) -> &str {
        match self {
            CategorySelector::AllCategories => "all",
            CategorySelector::Named(name) => name,
        }
    }
}

/// Uniform draw among the candidates not asked yet; `None` once all were asked.
pub fn pick_unseen<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question> {
    let mut available: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    available.sort_by_key(|q| q.id);
    available.choose(rng).cloned()
}

async fn candidate_pool(pool: &SqlitePool, selector: &CategorySelector) -> StoreResult<Vec<Question>> {
    match selector {
        CategorySelector::AllCategories => repository::fetch_all(pool, OrderBy::asc("id")).await,
        CategorySelector::Named(kind) => {
            let category = categories::find_by_type(pool, kind).await?;
            questions::questions_for_category(pool, category.id).await
        }
    }
}

#[tracing::instrument(skip(pool, previous), fields(previous = previous.len()))]
pub async fn next_question(
    pool: &SqlitePool,
    selector: &CategorySelector,
    previous: &HashSet<i64>,
) -> StoreResult<Option<Question>> {
    let candidates = candidate_pool(pool, selector).await?;
    let question = pick_unseen(candidates, previous, &mut rand::thread_rng());
    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_CNTR
                .with_label_values(&[selector.label()])
                .inc();
            tracing::debug!(question = q.id, "Serving quiz question");
        }
        None => tracing::debug!("No unseen questions left"),
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, StoreError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: i64) -> Question {
        Question {
            id,
            question: format!("Question {id}?"),
            answer: "Answer".to_owned(),
            category: 1,
            difficulty: 1,
        }
    }

    #[test]
    fn click_selects_every_category() {
        assert_eq!(CategorySelector::from_type("click"), CategorySelector::AllCategories);
        assert_eq!(
            CategorySelector::from_type("Art"),
            CategorySelector::Named("Art".to_owned())
        );
    }

    #[test]
    fn nothing_left_when_everything_was_asked() {
        let previous = HashSet::from([1, 2, 3]);
        let picked = pick_unseen((1..=3).map(question).collect(), &previous, &mut StdRng::seed_from_u64(7));
        assert!(picked.is_none());
    }

    #[test]
    fn last_remaining_question_is_picked() {
        let previous = HashSet::from([1, 3]);
        let picked = pick_unseen((1..=3).map(question).collect(), &previous, &mut StdRng::seed_from_u64(7));
        assert_eq!(picked.map(|q| q.id), Some(2));
    }

    #[test]
    fn every_unseen_question_can_be_drawn() {
        let previous = HashSet::from([2]);
        let mut rng = StdRng::seed_from_u64(42);
        let drawn: HashSet<i64> = (0..200)
            .filter_map(|_| pick_unseen((1..=4).map(question).collect(), &previous, &mut rng))
            .map(|q| q.id)
            .collect();
        assert_eq!(drawn, HashSet::from([1, 3, 4]));
    }

    #[test]
    fn seeded_draws_do_not_depend_on_input_order() {
        let previous = HashSet::new();
        let forward = pick_unseen((1..=9).map(question).collect(), &previous, &mut StdRng::seed_from_u64(3));
        let backward = pick_unseen(
            (1..=9).rev().map(question).collect(),
            &previous,
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn named_category_restricts_the_pool() {
        let pool = test_pool().await;
        let previous = HashSet::from([16, 17, 18]);
        let selector = CategorySelector::from_type("Art");
        let picked = next_question(&pool, &selector, &previous).await.unwrap();
        assert_eq!(picked.map(|q| q.id), Some(19));
    }

    #[tokio::test]
    async fn all_categories_draws_from_everything() {
        let pool = test_pool().await;
        let picked = next_question(&pool, &CategorySelector::AllCategories, &HashSet::new())
            .await
            .unwrap()
            .unwrap();
        assert!(repository::fetch_by_id::<Question>(&pool, picked.id).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let pool = test_pool().await;
        let selector = CategorySelector::from_type("Cooking");
        assert!(matches!(
            next_question(&pool, &selector, &HashSet::new()).await,
            Err(StoreError::NotFound)
        ));
    }
}
