//! [`Session`] definitions.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::RngCore as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// User session.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Opaque single-use token renewing a [`Session`].
///
/// Only its [`RefreshDigest`] is ever persisted.
#[derive(AsRef, Clone, Debug, Display, Eq, FromStr, PartialEq)]
#[as_ref(str)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Generates a new random [`RefreshToken`] of 256 bits.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(BASE64.encode(bytes))
    }

    /// Computes the [`RefreshDigest`] of this [`RefreshToken`].
    #[must_use]
    pub fn digest(&self) -> RefreshDigest {
        RefreshDigest(BASE64.encode(Sha256::digest(self.0.as_bytes())))
    }
}

/// [SHA-256] digest of a [`RefreshToken`].
///
/// [SHA-256]: https://en.wikipedia.org/wiki/SHA-2
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct RefreshDigest(String);

/// Issued [`RefreshToken`] awaiting its use.
#[derive(Clone, Debug)]
pub struct Refresh {
    /// [`RefreshDigest`] of the issued [`RefreshToken`].
    pub digest: RefreshDigest,

    /// ID of the [`User`] the [`RefreshToken`] was issued to.
    pub user_id: user::Id,

    /// [`DateTime`] when the [`RefreshToken`] expires.
    pub expires_at: RefreshExpirationDateTime,
}

impl Refresh {
    /// Indicates whether this [`Refresh`] is expired at the given moment.
    #[must_use]
    pub fn is_expired_at(&self, now: RefreshExpirationDateTime) -> bool {
        self.expires_at <= now
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

/// [`DateTime`] of a [`RefreshToken`] expiration.
pub type RefreshExpirationDateTime = DateTimeOf<(Refresh, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{Refresh, RefreshToken};
    use crate::domain::user;

    #[test]
    fn refresh_tokens_are_unique() {
        let (a, b) = (RefreshToken::generate(), RefreshToken::generate());

        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.as_ref().len(), 43);
    }

    #[test]
    fn digest_is_stable() {
        let token: RefreshToken = "some-token".parse().unwrap();

        assert_eq!(token.digest(), token.clone().digest());
        assert_ne!(token.digest().to_string(), token.to_string());
    }

    #[test]
    fn expiration() {
        let now = DateTime::now().coerce();
        let refresh = Refresh {
            digest: RefreshToken::generate().digest(),
            user_id: user::Id::new(),
            expires_at: now + Duration::from_secs(60),
        };

        assert!(!refresh.is_expired_at(now));
        assert!(refresh.is_expired_at(now + Duration::from_secs(60)));
    }
}
