//! In-memory [`RecipeStore`] used by the test suite in place of Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::recipes::store::RecipeStore;
use crate::recipes::types::{
    Comment, NewComment, NewRecipe, Page, Rating, Recipe, RecipeFilter, RecipePage, RecipeUpdate,
};

#[derive(Default)]
pub struct MemRecipeStore {
    // seq breaks createdAt ties so ordering stays deterministic.
    inner: RwLock<HashMap<Uuid, (u64, Recipe)>>,
    next_seq: RwLock<u64>,
}

impl MemRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(recipe: &Recipe, filter: &RecipeFilter) -> bool {
        if let Some(search) = &filter.search {
            if !recipe
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(tag) = &filter.tag {
            if !recipe.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(author) = &filter.author {
            if &recipe.author != author {
                return false;
            }
        }
        true
    }

    async fn sorted_matches(&self, filter: &RecipeFilter) -> Vec<Recipe> {
        let inner = self.inner.read().await;
        let mut entries: Vec<(u64, Recipe)> = inner
            .values()
            .filter(|(_, r)| Self::matches(r, filter))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then(b.0.cmp(&a.0)));
        entries.into_iter().map(|(_, r)| r).collect()
    }
}

#[async_trait]
impl RecipeStore for MemRecipeStore {
    async fn list(&self, filter: &RecipeFilter, page: Page) -> anyhow::Result<RecipePage> {
        let matches = self.sorted_matches(filter).await;
        let total_pages = page.total_pages(matches.len() as i64);
        let items = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok(RecipePage { items, total_pages })
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        Ok(self.inner.read().await.get(&id).map(|(_, r)| r.clone()))
    }

    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Recipe>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<(u64, Recipe)> = ids
            .iter()
            .filter_map(|id| inner.get(id).cloned())
            .collect();
        entries.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at).then(b.0.cmp(&a.0)));
        Ok(entries.into_iter().map(|(_, r)| r).collect())
    }

    async fn create(&self, new: NewRecipe) -> anyhow::Result<Recipe> {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            title: new.title,
            image: new.image,
            overview: new.overview,
            ingredients: new.ingredients,
            instructions: new.instructions,
            tags: new.tags,
            author: new.author,
            author_email: new.author_email,
            created_at: OffsetDateTime::now_utc(),
            comments: Vec::new(),
            ratings: Vec::new(),
        };
        let mut seq = self.next_seq.write().await;
        *seq += 1;
        self.inner
            .write()
            .await
            .insert(recipe.id, (*seq, recipe.clone()));
        Ok(recipe)
    }

    async fn update(&self, id: Uuid, changes: RecipeUpdate) -> anyhow::Result<Option<Recipe>> {
        let mut inner = self.inner.write().await;
        let Some((_, recipe)) = inner.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(image) = changes.image {
            recipe.image = image;
        }
        if let Some(overview) = changes.overview {
            recipe.overview = overview;
        }
        if let Some(ingredients) = changes.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = changes.instructions {
            recipe.instructions = instructions;
        }
        if let Some(tags) = changes.tags {
            recipe.tags = tags;
        }
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.remove(&id).is_some())
    }

    async fn distinct_tags(&self) -> anyhow::Result<Vec<String>> {
        let inner = self.inner.read().await;
        let mut tags: Vec<String> = inner
            .values()
            .flat_map(|(_, r)| r.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn upsert_rating(
        &self,
        id: Uuid,
        user_id: &str,
        score: i32,
    ) -> anyhow::Result<Option<Recipe>> {
        let mut inner = self.inner.write().await;
        let Some((_, recipe)) = inner.get_mut(&id) else {
            return Ok(None);
        };
        match recipe.ratings.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => existing.score = score,
            None => recipe.ratings.push(Rating {
                user_id: user_id.to_string(),
                score,
            }),
        }
        Ok(Some(recipe.clone()))
    }

    async fn append_comment(
        &self,
        id: Uuid,
        comment: NewComment,
    ) -> anyhow::Result<Option<Recipe>> {
        let mut inner = self.inner.write().await;
        let Some((_, recipe)) = inner.get_mut(&id) else {
            return Ok(None);
        };
        recipe.comments.push(Comment {
            text: comment.text,
            author_id: comment.author_id,
            author_email: comment.author_email,
            author_display_name: comment.author_display_name,
            author_profile_picture_url: comment.author_profile_picture_url,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(Some(recipe.clone()))
    }
}
