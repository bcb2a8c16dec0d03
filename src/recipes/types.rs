use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One structured ingredient line. The name is required, the amount is
/// free-form and optional ("a pinch", "200 g", absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub name: String,
}

/// A single user's rating of a recipe. At most one entry per user exists on
/// any recipe; a re-rate replaces the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: String,
    pub score: i32,
}

/// Comment snapshot. Display name and avatar are copied from the author's
/// profile at write time and never retroactively updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author_id: String,
    pub author_email: String,
    pub author_display_name: String,
    pub author_profile_picture_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub overview: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub tags: Vec<String>,
    pub author: String,
    pub author_email: String,
    pub created_at: OffsetDateTime,
    /// Storage order; presentation reverses to most-recent-first.
    pub comments: Vec<Comment>,
    pub ratings: Vec<Rating>,
}

impl Recipe {
    /// Arithmetic mean of all scores rounded to one decimal, 0 when unrated.
    /// Derived from `ratings` on every read, so it cannot drift from them.
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let sum: i32 = self.ratings.iter().map(|r| r.score).sum();
        round_to_tenth(f64::from(sum) / self.ratings.len() as f64)
    }

    pub fn rating_count(&self) -> i64 {
        self.ratings.len() as i64
    }

    /// The given user's score, 0 if they have not rated.
    pub fn score_by(&self, user_id: &str) -> i32 {
        self.ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.score)
            .unwrap_or(0)
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fields settable at creation. Identifier and timestamp are assigned by
/// the store; author and author_email are immutable afterwards.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub image: String,
    pub overview: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub tags: Vec<String>,
    pub author: String,
    pub author_email: String,
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub image: Option<String>,
    pub overview: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub author_id: String,
    pub author_email: String,
    pub author_display_name: String,
    pub author_profile_picture_url: String,
}

/// Conjunction of optional predicates applied by `RecipeStore::list`.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Exact tag membership.
    pub tag: Option<String>,
    /// Exact author subject match.
    pub author: Option<String>,
}

/// 1-indexed offset pagination.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub const DEFAULT_SIZE: i64 = 6;
    pub const MAX_SIZE: i64 = 50;

    pub fn new(number: i64, size: i64) -> Self {
        Self {
            number: number.max(1),
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.size - 1) / self.size
    }
}

#[derive(Debug)]
pub struct RecipePage {
    pub items: Vec<Recipe>,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_with_scores(scores: &[i32]) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            title: "Bread".into(),
            image: String::new(),
            overview: "Plain bread".into(),
            ingredients: vec![],
            instructions: "<p>Bake.</p>".into(),
            tags: vec![],
            author: "user-1".into(),
            author_email: "ana@example.com".into(),
            created_at: OffsetDateTime::now_utc(),
            comments: vec![],
            ratings: scores
                .iter()
                .enumerate()
                .map(|(i, &score)| Rating {
                    user_id: format!("rater-{i}"),
                    score,
                })
                .collect(),
        }
    }

    #[test]
    fn average_is_zero_when_unrated() {
        let r = recipe_with_scores(&[]);
        assert_eq!(r.average_rating(), 0.0);
        assert_eq!(r.rating_count(), 0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let r = recipe_with_scores(&[4, 4, 5]);
        assert_eq!(r.average_rating(), 4.3);
        assert_eq!(r.rating_count(), 3);
    }

    #[test]
    fn score_by_defaults_to_zero() {
        let r = recipe_with_scores(&[5]);
        assert_eq!(r.score_by("rater-0"), 5);
        assert_eq!(r.score_by("someone-else"), 0);
    }

    #[test]
    fn page_math() {
        let page = Page::new(1, 6);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(6), 1);
        assert_eq!(page.total_pages(7), 2);
        assert_eq!(Page::new(3, 6).offset(), 12);
        // page numbers below 1 are clamped
        assert_eq!(Page::new(0, 6).number, 1);
        assert_eq!(Page::new(1, 0).size, 1);
    }
}
