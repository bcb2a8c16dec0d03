//! In-memory [`ProfileStore`] used by the test suite in place of Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::profiles::store::ProfileStore;
use crate::profiles::types::{Profile, ProfileUpdate};
use crate::recipes::types::Page;

#[derive(Default)]
pub struct MemProfileStore {
    inner: RwLock<HashMap<String, Profile>>,
}

impl MemProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure<'a>(
    inner: &'a mut HashMap<String, Profile>,
    user_id: &str,
    fallback_display_name: &str,
) -> &'a mut Profile {
    inner.entry(user_id.to_string()).or_insert_with(|| Profile {
        user_id: user_id.to_string(),
        display_name: fallback_display_name.to_string(),
        bio: String::new(),
        profile_picture_url: String::new(),
        saved_recipes: Vec::new(),
    })
}

#[async_trait]
impl ProfileStore for MemProfileStore {
    async fn get(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        Ok(self.inner.read().await.get(user_id).cloned())
    }

    async fn upsert(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        changes: ProfileUpdate,
    ) -> anyhow::Result<Profile> {
        let mut inner = self.inner.write().await;
        let profile = ensure(&mut inner, user_id, fallback_display_name);
        if let Some(display_name) = changes.display_name {
            profile.display_name = display_name;
        }
        if let Some(bio) = changes.bio {
            profile.bio = bio;
        }
        if let Some(url) = changes.profile_picture_url {
            profile.profile_picture_url = url;
        }
        Ok(profile.clone())
    }

    async fn toggle_saved(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        recipe_id: Uuid,
    ) -> anyhow::Result<Profile> {
        let mut inner = self.inner.write().await;
        let profile = ensure(&mut inner, user_id, fallback_display_name);
        if let Some(pos) = profile.saved_recipes.iter().position(|id| *id == recipe_id) {
            profile.saved_recipes.remove(pos);
        } else {
            profile.saved_recipes.push(recipe_id);
        }
        Ok(profile.clone())
    }

    async fn saved_page(&self, user_id: &str, page: Page) -> anyhow::Result<(Vec<Uuid>, i64)> {
        let inner = self.inner.read().await;
        let Some(profile) = inner.get(user_id) else {
            return Ok((Vec::new(), 0));
        };
        let total = profile.saved_recipes.len() as i64;
        let ids = profile
            .saved_recipes
            .iter()
            .copied()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok((ids, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggle_creates_profile_lazily() {
        let store = MemProfileStore::new();
        let recipe = Uuid::new_v4();
        let profile = store
            .toggle_saved("user-1", "ana@example.com", recipe)
            .await
            .unwrap();
        assert_eq!(profile.display_name, "ana@example.com");
        assert_eq!(profile.saved_recipes, vec![recipe]);
    }

    #[tokio::test]
    async fn toggle_twice_removes_again() {
        let store = MemProfileStore::new();
        let recipe = Uuid::new_v4();
        store
            .toggle_saved("user-1", "Ana", recipe)
            .await
            .unwrap();
        let profile = store
            .toggle_saved("user-1", "Ana", recipe)
            .await
            .unwrap();
        assert!(profile.saved_recipes.is_empty());
    }

    #[tokio::test]
    async fn upsert_merges_only_provided_fields() {
        let store = MemProfileStore::new();
        store
            .upsert(
                "user-1",
                "ana@example.com",
                ProfileUpdate {
                    display_name: Some("Ana".into()),
                    bio: Some("Cooks a lot".into()),
                    profile_picture_url: None,
                },
            )
            .await
            .unwrap();

        let profile = store
            .upsert(
                "user-1",
                "ana@example.com",
                ProfileUpdate {
                    display_name: None,
                    bio: None,
                    profile_picture_url: Some("https://cdn.example/ana.png".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.display_name, "Ana");
        assert_eq!(profile.bio, "Cooks a lot");
        assert_eq!(profile.profile_picture_url, "https://cdn.example/ana.png");
    }

    #[tokio::test]
    async fn saved_page_is_empty_for_unknown_user() {
        let store = MemProfileStore::new();
        let (ids, total) = store
            .saved_page("nobody", Page::new(1, 6))
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(total, 0);
    }
}
