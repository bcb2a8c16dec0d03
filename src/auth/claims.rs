use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token from the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable opaque subject identifier.
    pub sub: String,
    /// Email claim, snapshotted into authored records at write time.
    pub email: String,
    /// Optional display-name claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// The verified caller, passed explicitly into every operation that needs
/// authorization or attribution. Never read from ambient state.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl Subject {
    /// Display name claim if present, falling back to the email.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

impl From<Claims> for Subject {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        }
    }
}
