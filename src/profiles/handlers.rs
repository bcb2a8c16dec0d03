use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::profiles::types::{Profile, ProfileUpdate};
use crate::recipes::dto::{PageQuery, RecipeListView};
use crate::recipes::{self, types::RecipeFilter};
use crate::state::AppState;

use super::dto::{ProfileView, PublicProfileView, UpdateProfileRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/profile/:user_id", get(public_profile))
        .route("/users/me", put(update_me))
        .route("/users/save/:recipe_id", put(toggle_saved))
        .route("/users/saved-recipes", get(saved_recipes))
}

/// Public profile plus a page of the subject's recipes. Absent profiles
/// are rendered as a zero-value view rather than a 404: the subject exists
/// in the identity provider, they just never edited their profile.
#[instrument(skip(state))]
async fn public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<PublicProfileView>> {
    let profile = state
        .profiles
        .get(&user_id)
        .await?
        .unwrap_or_else(|| Profile::placeholder(&user_id));

    let page = q.page();
    let recipes = recipes::service::list_for_author(
        state.recipes.as_ref(),
        &user_id,
        RecipeFilter::default(),
        page,
    )
    .await?;

    Ok(Json(PublicProfileView {
        user: profile.into(),
        recipes: RecipeListView::new(recipes, page.number),
    }))
}

#[instrument(skip(state, payload))]
async fn update_me(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileView>> {
    let changes = ProfileUpdate {
        display_name: payload.display_name,
        bio: payload.bio,
        profile_picture_url: payload.profile_picture_url,
    };
    let profile = state
        .profiles
        .upsert(&subject.id, subject.display_name_or_email(), changes)
        .await?;
    info!(user_id = %subject.id, "profile updated");
    Ok(Json(profile.into()))
}

#[instrument(skip(state))]
async fn toggle_saved(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<Json<ProfileView>> {
    let profile = state
        .profiles
        .toggle_saved(&subject.id, subject.display_name_or_email(), recipe_id)
        .await?;
    Ok(Json(profile.into()))
}

#[instrument(skip(state))]
async fn saved_recipes(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<RecipeListView>> {
    let page = q.page();
    let result = recipes::service::list_saved(
        state.recipes.as_ref(),
        state.profiles.as_ref(),
        &subject.id,
        page,
    )
    .await?;
    Ok(Json(RecipeListView::new(result, page.number)))
}
