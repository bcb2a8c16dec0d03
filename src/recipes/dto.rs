use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::types::{Comment, Ingredient, Page, Recipe, RecipeFilter, RecipePage};

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    Page::DEFAULT_SIZE
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl ListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }

    pub fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            search: self.search.clone(),
            tag: self.tag.clone(),
            author: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Create payload. Tags arrive as comma-joined text and are normalized
/// (trimmed, empties dropped, exact-match deduplicated) before storage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub overview: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    #[serde(default)]
    pub tags: String,
}

/// Partial update payload; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub image: Option<String>,
    pub overview: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub text: String,
    pub author_id: String,
    pub author_email: String,
    pub author_display_name: String,
    pub author_profile_picture_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            text: c.text,
            author_id: c.author_id,
            author_email: c.author_email,
            author_display_name: c.author_display_name,
            author_profile_picture_url: c.author_profile_picture_url,
            created_at: c.created_at,
        }
    }
}

/// Wire shape of a recipe. Rating aggregates are derived here; the raw
/// per-user rating entries are not exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub overview: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub tags: Vec<String>,
    pub author: String,
    pub author_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub average_rating: f64,
    pub rating_count: i64,
    /// Most recent first.
    pub comments: Vec<CommentView>,
}

impl From<Recipe> for RecipeView {
    fn from(r: Recipe) -> Self {
        let average_rating = r.average_rating();
        let rating_count = r.rating_count();
        Self {
            id: r.id,
            title: r.title,
            image: r.image,
            overview: r.overview,
            ingredients: r.ingredients,
            instructions: r.instructions,
            tags: r.tags,
            author: r.author,
            author_email: r.author_email,
            created_at: r.created_at,
            average_rating,
            rating_count,
            comments: r.comments.into_iter().rev().map(CommentView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListView {
    pub recipes: Vec<RecipeView>,
    pub total_pages: i64,
    pub current_page: i64,
}

impl RecipeListView {
    pub fn new(page: RecipePage, current_page: i64) -> Self {
        Self {
            recipes: page.items.into_iter().map(RecipeView::from).collect(),
            total_pages: page.total_pages,
            current_page,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryView {
    pub average_rating: f64,
    pub rating_count: i64,
    pub user_score: i32,
}
