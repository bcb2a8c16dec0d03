use serde::Deserialize;

/// Settings for verifying bearer tokens issued by the external identity
/// provider. Production deployments configure the provider's RS256 public
/// key; an HS256 shared secret is accepted for local development.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub public_key_pem: Option<String>,
    pub hs256_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base under which uploaded objects are publicly reachable.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "recipebook".into()),
            audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "recipebook-users".into()),
            public_key_pem: std::env::var("AUTH_PUBLIC_KEY_PEM").ok(),
            hs256_secret: std::env::var("AUTH_HS256_SECRET").ok(),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "recipebook".into()),
            access_key: std::env::var("STORAGE_ACCESS_KEY")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000/recipebook".into()),
        };
        Ok(Self {
            database_url,
            auth,
            storage,
        })
    }
}
