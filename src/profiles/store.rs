use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::profiles::types::{Profile, ProfileUpdate};
use crate::recipes::types::Page;

/// Profile persistence boundary. Writes create the profile lazily when it
/// does not exist yet; `fallback_display_name` seeds the required display
/// name on that first write (display-name claim or email of the caller).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> anyhow::Result<Option<Profile>>;

    async fn upsert(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        changes: ProfileUpdate,
    ) -> anyhow::Result<Profile>;

    /// Adds the recipe to the saved set if absent, removes it if present.
    async fn toggle_saved(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        recipe_id: Uuid,
    ) -> anyhow::Result<Profile>;

    /// One page of the saved identifier set plus its total cardinality.
    /// Identifiers are returned as stored; callers resolve them and deal
    /// with ones whose recipe has since been deleted.
    async fn saved_page(&self, user_id: &str, page: Page) -> anyhow::Result<(Vec<Uuid>, i64)>;
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    display_name: String,
    bio: String,
    profile_picture_url: String,
    saved_recipes: Vec<Uuid>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            display_name: row.display_name,
            bio: row.bio,
            profile_picture_url: row.profile_picture_url,
            saved_recipes: row.saved_recipes,
        }
    }
}

const PROFILE_SELECT: &str = r#"
    SELECT p.user_id, p.display_name, p.bio, p.profile_picture_url,
           COALESCE((
               SELECT array_agg(s.recipe_id) FROM saved_recipes s WHERE s.user_id = p.user_id
           ), ARRAY[]::uuid[]) AS saved_recipes
    FROM profiles p
"#;

pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Profile::from))
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        self.fetch(user_id).await
    }

    async fn upsert(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        changes: ProfileUpdate,
    ) -> anyhow::Result<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, bio, profile_picture_url)
            VALUES ($1, COALESCE($2, $5), COALESCE($3, ''), COALESCE($4, ''))
            ON CONFLICT (user_id) DO UPDATE SET
                display_name        = COALESCE($2, profiles.display_name),
                bio                 = COALESCE($3, profiles.bio),
                profile_picture_url = COALESCE($4, profiles.profile_picture_url)
            "#,
        )
        .bind(user_id)
        .bind(&changes.display_name)
        .bind(&changes.bio)
        .bind(&changes.profile_picture_url)
        .bind(fallback_display_name)
        .execute(&self.db)
        .await?;

        self.fetch(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("profile vanished after upsert"))
    }

    async fn toggle_saved(
        &self,
        user_id: &str,
        fallback_display_name: &str,
        recipe_id: Uuid,
    ) -> anyhow::Result<Profile> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(fallback_display_name)
        .execute(&mut *tx)
        .await?;

        let removed = sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() == 0 {
            sqlx::query("INSERT INTO saved_recipes (user_id, recipe_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.fetch(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("profile vanished after toggle"))
    }

    async fn saved_page(&self, user_id: &str, page: Page) -> anyhow::Result<(Vec<Uuid>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_recipes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT recipe_id FROM saved_recipes
            WHERE user_id = $1
            ORDER BY recipe_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;

        Ok((ids, total))
    }
}
