//! Aggregation logic on top of the stores: input validation, tag
//! normalization, ownership checks, rating upserts, comment snapshots, and
//! saved-recipe resolution.

use uuid::Uuid;

use crate::auth::Subject;
use crate::error::{ApiError, ApiResult};
use crate::profiles::store::ProfileStore;
use crate::recipes::dto::{CreateRecipeRequest, RatingSummaryView, UpdateRecipeRequest};
use crate::recipes::store::RecipeStore;
use crate::recipes::types::{
    Ingredient, NewComment, NewRecipe, Page, Recipe, RecipeFilter, RecipePage, RecipeUpdate,
};

/// Splits comma-joined tag text, trims each entry, drops empties, and
/// deduplicates by exact match preserving first-occurrence order. Running
/// the result through again yields the same set.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn require(value: &str, what: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{what} is required")));
    }
    Ok(())
}

fn validate_ingredients(ingredients: &[Ingredient]) -> ApiResult<()> {
    if ingredients.iter().any(|i| i.name.trim().is_empty()) {
        return Err(ApiError::InvalidInput(
            "every ingredient needs a name".into(),
        ));
    }
    Ok(())
}

pub async fn get_recipe(store: &dyn RecipeStore, id: Uuid) -> ApiResult<Recipe> {
    store
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))
}

pub async fn list_public(
    store: &dyn RecipeStore,
    filter: &RecipeFilter,
    page: Page,
) -> ApiResult<RecipePage> {
    Ok(store.list(filter, page).await?)
}

pub async fn list_for_author(
    store: &dyn RecipeStore,
    author: &str,
    mut filter: RecipeFilter,
    page: Page,
) -> ApiResult<RecipePage> {
    filter.author = Some(author.to_string());
    Ok(store.list(&filter, page).await?)
}

pub async fn create_recipe(
    store: &dyn RecipeStore,
    subject: &Subject,
    payload: CreateRecipeRequest,
) -> ApiResult<Recipe> {
    require(&payload.title, "title")?;
    require(&payload.overview, "overview")?;
    require(&payload.instructions, "instructions")?;
    validate_ingredients(&payload.ingredients)?;

    let new = NewRecipe {
        title: payload.title,
        image: payload.image,
        overview: payload.overview,
        ingredients: payload.ingredients,
        instructions: payload.instructions,
        tags: normalize_tags(&payload.tags),
        author: subject.id.clone(),
        author_email: subject.email.clone(),
    };
    Ok(store.create(new).await?)
}

pub async fn update_recipe(
    store: &dyn RecipeStore,
    subject: &Subject,
    id: Uuid,
    payload: UpdateRecipeRequest,
) -> ApiResult<Recipe> {
    let existing = get_recipe(store, id).await?;
    if existing.author != subject.id {
        return Err(ApiError::Forbidden("Not authorized to edit this recipe"));
    }

    if let Some(title) = &payload.title {
        require(title, "title")?;
    }
    if let Some(overview) = &payload.overview {
        require(overview, "overview")?;
    }
    if let Some(instructions) = &payload.instructions {
        require(instructions, "instructions")?;
    }
    if let Some(ingredients) = &payload.ingredients {
        validate_ingredients(ingredients)?;
    }

    let changes = RecipeUpdate {
        title: payload.title,
        image: payload.image,
        overview: payload.overview,
        ingredients: payload.ingredients,
        instructions: payload.instructions,
        tags: payload.tags.as_deref().map(normalize_tags),
    };
    store
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))
}

pub async fn delete_recipe(store: &dyn RecipeStore, subject: &Subject, id: Uuid) -> ApiResult<()> {
    let existing = get_recipe(store, id).await?;
    if existing.author != subject.id {
        return Err(ApiError::Forbidden("Not authorized to delete this recipe"));
    }
    if !store.delete(id).await? {
        return Err(ApiError::NotFound("Recipe"));
    }
    Ok(())
}

/// Upserts the caller's rating. Calling twice with the same score is a
/// no-op on the aggregates; a changed score replaces the previous entry
/// rather than adding a second one.
pub async fn rate(
    store: &dyn RecipeStore,
    rater_id: &str,
    id: Uuid,
    score: i32,
) -> ApiResult<Recipe> {
    if !(1..=5).contains(&score) {
        return Err(ApiError::InvalidInput(
            "score must be an integer between 1 and 5".into(),
        ));
    }
    store
        .upsert_rating(id, rater_id, score)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))
}

pub async fn rating_summary(
    store: &dyn RecipeStore,
    id: Uuid,
    viewer: Option<&str>,
) -> ApiResult<RatingSummaryView> {
    let recipe = get_recipe(store, id).await?;
    Ok(RatingSummaryView {
        average_rating: recipe.average_rating(),
        rating_count: recipe.rating_count(),
        user_score: viewer.map(|v| recipe.score_by(v)).unwrap_or(0),
    })
}

/// Appends a comment carrying a snapshot of the author's *current* profile
/// display name and avatar. Later profile edits leave old comments as they
/// were.
pub async fn add_comment(
    recipes: &dyn RecipeStore,
    profiles: &dyn ProfileStore,
    subject: &Subject,
    id: Uuid,
    text: &str,
) -> ApiResult<Recipe> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidInput("comment text is required".into()));
    }

    let profile = profiles.get(&subject.id).await?;
    let display_name = profile
        .as_ref()
        .filter(|p| !p.display_name.is_empty())
        .map(|p| p.display_name.clone())
        .unwrap_or_else(|| subject.display_name_or_email().to_string());
    let avatar = profile
        .map(|p| p.profile_picture_url)
        .unwrap_or_default();

    let comment = NewComment {
        text: text.to_string(),
        author_id: subject.id.clone(),
        author_email: subject.email.clone(),
        author_display_name: display_name,
        author_profile_picture_url: avatar,
    };
    recipes
        .append_comment(id, comment)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))
}

/// Pages over the caller's saved identifier set, then resolves the page to
/// records. Identifiers whose recipe has been deleted are skipped, so a
/// page may come back shorter than the page size while totalPages still
/// reflects the set's cardinality.
pub async fn list_saved(
    recipes: &dyn RecipeStore,
    profiles: &dyn ProfileStore,
    user_id: &str,
    page: Page,
) -> ApiResult<RecipePage> {
    let (ids, total) = profiles.saved_page(user_id, page).await?;
    let items = recipes.get_many(&ids).await?;
    Ok(RecipePage {
        items,
        total_pages: page.total_pages(total),
    })
}
