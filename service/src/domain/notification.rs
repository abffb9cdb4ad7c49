//! [`Notification`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Message sent to a [`User`].
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the [`User`] receiving this [`Notification`].
    pub user_id: user::Id,

    /// [`Message`] of this [`Notification`].
    pub message: Message,

    /// [`Kind`] of channel this [`Notification`] is delivered through.
    pub kind: Kind,

    /// [`DateTime`] when this [`Notification`] was sent.
    pub created_at: CreationDateTime,
}

/// ID of a [`Notification`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Text of a [`Notification`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Message(String);

impl Message {
    /// Creates a new [`Message`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Message`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.chars().count() <= 255
    }
}

impl FromStr for Message {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

define_kind! {
    #[doc = "Delivery channel of a [`Notification`]."]
    enum Kind {
        #[doc = "Email letter."]
        Email = 1,

        #[doc = "SMS message."]
        Sms = 2,

        #[doc = "Push notification."]
        Push = 3,
    }
}

/// [`DateTime`] when a [`Notification`] was sent.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;
