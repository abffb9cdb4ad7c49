//! [`Notification`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A message sent to a `User`.
#[derive(Clone, Debug, From)]
pub struct Notification(domain::Notification);

/// A message sent to a `User`.
#[graphql_object(context = Context)]
impl Notification {
    /// Unique identifier of this `Notification`.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id.into()
    }

    /// `User` receiving this `Notification`.
    #[must_use]
    pub fn user(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Notification` references existing `User`"
        )]
        unsafe {
            api::User::new_unchecked(self.0.user_id)
        }
    }

    /// Text of this `Notification`.
    #[must_use]
    pub fn message(&self) -> Message {
        self.0.message.clone().into()
    }

    /// Channel this `Notification` is delivered through.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// `DateTime` when this `Notification` was sent.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Text of a `Notification`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NotificationMessage",
    with = scalar::Via::<domain::notification::Message>,
)]
pub struct Message(domain::notification::Message);

/// Delivery channel of a `Notification`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "NotificationKind")]
pub enum Kind {
    /// Email letter.
    Email,

    /// SMS message.
    Sms,

    /// Push notification.
    Push,
}

impl From<domain::notification::Kind> for Kind {
    fn from(kind: domain::notification::Kind) -> Self {
        use domain::notification::Kind as K;
        match kind {
            K::Email => Self::Email,
            K::Sms => Self::Sms,
            K::Push => Self::Push,
        }
    }
}

impl From<Kind> for domain::notification::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Email => Self::Email,
            Kind::Sms => Self::Sms,
            Kind::Push => Self::Push,
        }
    }
}
