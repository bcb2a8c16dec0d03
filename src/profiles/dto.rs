use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profiles::types::Profile;
use crate::recipes::dto::RecipeListView;

/// Partial profile edit; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: String,
    pub display_name: String,
    pub bio: String,
    pub profile_picture_url: String,
    pub saved_recipes: Vec<Uuid>,
}

impl From<Profile> for ProfileView {
    fn from(p: Profile) -> Self {
        Self {
            user_id: p.user_id,
            display_name: p.display_name,
            bio: p.bio,
            profile_picture_url: p.profile_picture_url,
            saved_recipes: p.saved_recipes,
        }
    }
}

/// Public profile page: the (possibly synthesized) profile plus one page of
/// the subject's recipes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileView {
    pub user: ProfileView,
    #[serde(flatten)]
    pub recipes: RecipeListView,
}
