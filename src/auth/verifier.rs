use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::config::AuthConfig;

/// Validates bearer tokens issued by the external identity provider.
///
/// The provider signs with RS256; we hold only the public key and never
/// issue tokens ourselves. HS256 with a shared secret is supported so local
/// development and tests can mint their own tokens.
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(decoding: DecodingKey, algorithm: Algorithm, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(std::slice::from_ref(&issuer));
        validation.set_audience(std::slice::from_ref(&audience));
        Self {
            decoding,
            validation,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        if let Some(pem) = &cfg.public_key_pem {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
            Ok(Self::new(key, Algorithm::RS256, &cfg.issuer, &cfg.audience))
        } else if let Some(secret) = &cfg.hs256_secret {
            let key = DecodingKey::from_secret(secret.as_bytes());
            Ok(Self::new(key, Algorithm::HS256, &cfg.issuer, &cfg.audience))
        } else {
            anyhow::bail!("either AUTH_PUBLIC_KEY_PEM or AUTH_HS256_SECRET must be set")
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        debug!(subject = %data.claims.sub, "token verified");
        Ok(data.claims)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{token_for, verifier, TEST_SECRET};
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    #[test]
    fn verifies_a_well_formed_token() {
        let token = token_for("user-1", "ana@example.com", Some("Ana"));
        let claims = verifier().verify(&token).expect("verify");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn rejects_wrong_issuer_or_audience() {
        let strict = TokenVerifier::new(
            DecodingKey::from_secret(TEST_SECRET.as_bytes()),
            Algorithm::HS256,
            "other-issuer",
            "other-aud",
        );
        let token = token_for("user-1", "ana@example.com", None);
        assert!(strict.verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "user-1".into(),
            email: "ana@example.com".into(),
            name: None,
            iat: now - 7200,
            exp: now - 3600,
            iss: super::testing::TEST_ISSUER.into(),
            aud: super::testing::TEST_AUDIENCE.into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(verifier().verify("not-a-token").is_err());
    }

    #[test]
    fn from_config_requires_key_material() {
        let cfg = crate::config::AuthConfig {
            issuer: "iss".into(),
            audience: "aud".into(),
            public_key_pem: None,
            hs256_secret: None,
        };
        assert!(TokenVerifier::from_config(&cfg).is_err());
    }
}
