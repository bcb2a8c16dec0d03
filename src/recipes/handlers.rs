use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiResult;
use crate::state::AppState;

use super::dto::{
    CommentRequest, CreateRecipeRequest, ListQuery, RateRequest, RatingSummaryView,
    RecipeListView, RecipeView, UpdateRecipeRequest,
};
use super::service;

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/recipes/public", get(list_public))
        .route("/recipes/tags", get(list_tags))
        .route("/recipes/user/:user_id", get(list_by_author))
        .route("/recipes", get(list_mine))
        .route("/recipes/:id", get(get_recipe))
        .route("/recipes/:id/rating", get(rating_summary))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(create_recipe))
        .route("/recipes/:id", put(update_recipe).delete(delete_recipe))
        .route("/recipes/:id/comments", post(add_comment))
        .route("/recipes/:id/rate", post(rate_recipe))
}

#[instrument(skip(state))]
async fn list_public(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<RecipeListView>> {
    let page = q.page();
    let result = service::list_public(state.recipes.as_ref(), &q.filter(), page).await?;
    Ok(Json(RecipeListView::new(result, page.number)))
}

#[instrument(skip(state))]
async fn list_mine(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<RecipeListView>> {
    let page = q.page();
    let result =
        service::list_for_author(state.recipes.as_ref(), &subject.id, q.filter(), page).await?;
    Ok(Json(RecipeListView::new(result, page.number)))
}

#[instrument(skip(state))]
async fn list_by_author(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<RecipeListView>> {
    let page = q.page();
    let result =
        service::list_for_author(state.recipes.as_ref(), &user_id, q.filter(), page).await?;
    Ok(Json(RecipeListView::new(result, page.number)))
}

#[instrument(skip(state))]
async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.recipes.distinct_tags().await?))
}

#[instrument(skip(state))]
async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = service::get_recipe(state.recipes.as_ref(), id).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state, payload))]
async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let recipe = service::create_recipe(state.recipes.as_ref(), &subject, payload).await?;
    info!(recipe_id = %recipe.id, author = %subject.id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

#[instrument(skip(state, payload))]
async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = service::update_recipe(state.recipes.as_ref(), &subject, id, payload).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state))]
async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    service::delete_recipe(state.recipes.as_ref(), &subject, id).await?;
    info!(recipe_id = %id, author = %subject.id, "recipe deleted");
    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}

#[instrument(skip(state, payload))]
async fn add_comment(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let recipe = service::add_comment(
        state.recipes.as_ref(),
        state.profiles.as_ref(),
        &subject,
        id,
        &payload.text,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

#[instrument(skip(state))]
async fn rate_recipe(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateRequest>,
) -> ApiResult<Json<RecipeView>> {
    let recipe = service::rate(state.recipes.as_ref(), &subject.id, id, payload.score).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state))]
async fn rating_summary(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RatingSummaryView>> {
    let summary = service::rating_summary(
        state.recipes.as_ref(),
        id,
        viewer.as_ref().map(|s| s.id.as_str()),
    )
    .await?;
    Ok(Json(summary))
}
