use uuid::Uuid;

/// Per-subject profile. Created lazily on the first profile-mutating action
/// and never hard-deleted.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub bio: String,
    pub profile_picture_url: String,
    /// Membership only; no ordering guarantee.
    pub saved_recipes: Vec<Uuid>,
}

impl Profile {
    /// Zero-value view for read paths when no profile exists yet.
    pub fn placeholder(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: String::new(),
            bio: String::new(),
            profile_picture_url: String::new(),
            saved_recipes: Vec::new(),
        }
    }
}

/// Partial profile update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}
