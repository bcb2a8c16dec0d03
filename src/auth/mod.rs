mod claims;
pub(crate) mod extractors;
pub(crate) mod verifier;

pub use claims::Subject;
pub use extractors::{AuthUser, MaybeAuthUser};
pub use verifier::TokenVerifier;
