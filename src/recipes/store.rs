use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::types::{
    Comment, Ingredient, NewComment, NewRecipe, Page, Rating, Recipe, RecipeFilter, RecipePage,
    RecipeUpdate,
};

/// Recipe persistence boundary. Absence is reported as `None`/`false`, never
/// as an error; infrastructure failures bubble up as `anyhow::Error`.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Filtered, createdAt-descending, offset-paginated retrieval.
    async fn list(&self, filter: &RecipeFilter, page: Page) -> anyhow::Result<RecipePage>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>>;

    /// Resolves identifiers to records, createdAt-descending. Identifiers
    /// with no backing record are silently skipped.
    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Recipe>>;

    async fn create(&self, new: NewRecipe) -> anyhow::Result<Recipe>;

    /// Partial field replace. Author, author email and creation time are
    /// immutable and not part of [`RecipeUpdate`].
    async fn update(&self, id: Uuid, changes: RecipeUpdate) -> anyhow::Result<Option<Recipe>>;

    /// Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// All tags currently in use, sorted, deduplicated.
    async fn distinct_tags(&self) -> anyhow::Result<Vec<String>>;

    /// Atomically inserts or replaces the rater's entry. Returns the updated
    /// recipe, or `None` when the recipe does not exist.
    async fn upsert_rating(
        &self,
        id: Uuid,
        user_id: &str,
        score: i32,
    ) -> anyhow::Result<Option<Recipe>>;

    /// Appends to the recipe's comment sequence. Returns the updated recipe,
    /// or `None` when the recipe does not exist.
    async fn append_comment(
        &self,
        id: Uuid,
        comment: NewComment,
    ) -> anyhow::Result<Option<Recipe>>;
}

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: Uuid,
    title: String,
    image: String,
    overview: String,
    ingredients: Json<Vec<Ingredient>>,
    instructions: String,
    tags: Vec<String>,
    author: String,
    author_email: String,
    created_at: OffsetDateTime,
    comments: Json<Vec<Comment>>,
    ratings: Json<Vec<Rating>>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            image: row.image,
            overview: row.overview,
            ingredients: row.ingredients.0,
            instructions: row.instructions,
            tags: row.tags,
            author: row.author,
            author_email: row.author_email,
            created_at: row.created_at,
            comments: row.comments.0,
            ratings: row.ratings.0,
        }
    }
}

// Shared projection: the recipe document with its rating and comment
// sub-collections folded in as jsonb, keys matching the serde field names.
const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.title, r.image, r.overview, r.ingredients, r.instructions,
           r.tags, r.author, r.author_email, r.created_at,
           COALESCE((
               SELECT jsonb_agg(jsonb_build_object(
                          'text', c.text,
                          'author_id', c.author_id,
                          'author_email', c.author_email,
                          'author_display_name', c.author_display_name,
                          'author_profile_picture_url', c.author_profile_picture_url,
                          'created_at', c.created_at)
                      ORDER BY c.created_at ASC, c.id ASC)
               FROM recipe_comments c WHERE c.recipe_id = r.id
           ), '[]'::jsonb) AS comments,
           COALESCE((
               SELECT jsonb_agg(jsonb_build_object('user_id', t.user_id, 'score', t.score))
               FROM recipe_ratings t WHERE t.recipe_id = r.id
           ), '[]'::jsonb) AS ratings
    FROM recipes r
"#;

const RECIPE_FILTER_WHERE: &str = r#"
    WHERE ($1 IS NULL OR r.title ILIKE '%' || $1 || '%')
      AND ($2 IS NULL OR $2 = ANY(r.tags))
      AND ($3 IS NULL OR r.author = $3)
"#;

pub struct PgRecipeStore {
    db: PgPool,
}

impl PgRecipeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Recipe::from))
    }

    async fn exists(&self, id: Uuid) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn list(&self, filter: &RecipeFilter, page: Page) -> anyhow::Result<RecipePage> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM recipes r {RECIPE_FILTER_WHERE}"))
                .bind(&filter.search)
                .bind(&filter.tag)
                .bind(&filter.author)
                .fetch_one(&self.db)
                .await?;

        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "{RECIPE_SELECT} {RECIPE_FILTER_WHERE} ORDER BY r.created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.search)
        .bind(&filter.tag)
        .bind(&filter.author)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(RecipePage {
            items: rows.into_iter().map(Recipe::from).collect(),
            total_pages: page.total_pages(total),
        })
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        self.fetch(id).await
    }

    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "{RECIPE_SELECT} WHERE r.id = ANY($1) ORDER BY r.created_at DESC"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn create(&self, new: NewRecipe) -> anyhow::Result<Recipe> {
        let id = Uuid::new_v4();
        let created_at: OffsetDateTime = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (id, title, image, overview, ingredients, instructions,
                                 tags, author, author_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.image)
        .bind(&new.overview)
        .bind(Json(&new.ingredients))
        .bind(&new.instructions)
        .bind(&new.tags)
        .bind(&new.author)
        .bind(&new.author_email)
        .fetch_one(&self.db)
        .await?;

        Ok(Recipe {
            id,
            title: new.title,
            image: new.image,
            overview: new.overview,
            ingredients: new.ingredients,
            instructions: new.instructions,
            tags: new.tags,
            author: new.author,
            author_email: new.author_email,
            created_at,
            comments: Vec::new(),
            ratings: Vec::new(),
        })
    }

    async fn update(&self, id: Uuid, changes: RecipeUpdate) -> anyhow::Result<Option<Recipe>> {
        let result = sqlx::query(
            r#"
            UPDATE recipes SET
                title        = COALESCE($2, title),
                image        = COALESCE($3, image),
                overview     = COALESCE($4, overview),
                ingredients  = COALESCE($5, ingredients),
                instructions = COALESCE($6, instructions),
                tags         = COALESCE($7, tags)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.image)
        .bind(&changes.overview)
        .bind(changes.ingredients.as_ref().map(Json))
        .bind(&changes.instructions)
        .bind(&changes.tags)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn distinct_tags(&self) -> anyhow::Result<Vec<String>> {
        let tags: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT unnest(tags) AS tag FROM recipes ORDER BY tag")
                .fetch_all(&self.db)
                .await?;
        Ok(tags)
    }

    async fn upsert_rating(
        &self,
        id: Uuid,
        user_id: &str,
        score: i32,
    ) -> anyhow::Result<Option<Recipe>> {
        if !self.exists(id).await? {
            return Ok(None);
        }

        // The composite primary key makes this a single atomic
        // read-modify-write; concurrent raters cannot lose each other's
        // entries.
        sqlx::query(
            r#"
            INSERT INTO recipe_ratings (recipe_id, user_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (recipe_id, user_id) DO UPDATE SET score = EXCLUDED.score
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(score)
        .execute(&self.db)
        .await?;

        self.fetch(id).await
    }

    async fn append_comment(
        &self,
        id: Uuid,
        comment: NewComment,
    ) -> anyhow::Result<Option<Recipe>> {
        if !self.exists(id).await? {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO recipe_comments
                (id, recipe_id, text, author_id, author_email,
                 author_display_name, author_profile_picture_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(&comment.text)
        .bind(&comment.author_id)
        .bind(&comment.author_email)
        .bind(&comment.author_display_name)
        .bind(&comment.author_profile_picture_url)
        .execute(&self.db)
        .await?;

        self.fetch(id).await
    }
}
